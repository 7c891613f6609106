//! Rolegraph CLI - Inspect role graph snapshots
//!
//! Usage:
//!   rolegraph check <seed>                    - Audit the graph for cycles
//!   rolegraph permissions <seed> --role <r>   - Resolve a role's permissions
//!   rolegraph user <seed> --user <id>         - Resolve a user's permissions
//!   rolegraph hierarchy <seed>                - List roles by hierarchy level

use clap::{Parser, Subcommand};
use cli::commands::{CheckCommand, HierarchyCommand, PermissionsCommand, UserCommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rolegraph")]
#[command(about = "Rolegraph - Role inheritance and permission resolution")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the role graph for inheritance cycles
    Check(CheckCommand),
    /// Show a role's own, inherited and effective permissions
    Permissions(PermissionsCommand),
    /// Show a user's effective permissions
    User(UserCommand),
    /// List roles by hierarchy level
    Hierarchy(HierarchyCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check(cmd) => cmd.run(cli.json),
        Commands::Permissions(cmd) => cmd.run(cli.json),
        Commands::User(cmd) => cmd.run(cli.json),
        Commands::Hierarchy(cmd) => cmd.run(cli.json),
    }
}
