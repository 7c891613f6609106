//! CLI Commands

pub mod check;
pub mod hierarchy;
pub mod permissions;
pub mod user;

pub use check::CheckCommand;
pub use hierarchy::HierarchyCommand;
pub use permissions::PermissionsCommand;
pub use user::UserCommand;

use clap::Args;
use console::style;
use shared::PermissionSet;
use std::path::PathBuf;

/// Where the role graph comes from
#[derive(Debug, Clone, Args)]
pub struct SeedArgs {
    /// Seed file describing roles and users (.yaml, .yml or .json)
    pub seed: PathBuf,

    /// Engine configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub(crate) fn print_permissions(label: &str, permissions: &PermissionSet) {
    println!("{} ({})", style(label).bold(), permissions.len());
    if permissions.is_empty() {
        println!("  {}", style("(none)").dim());
    }
    for permission in permissions {
        println!("  • {}", permission);
    }
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
