//! rolegraph user command

use clap::Args;
use console::style;
use serde::Serialize;
use shared::{PermissionSet, UserId};

use super::{print_json, print_permissions, SeedArgs};
use crate::context::GraphContext;

#[derive(Debug, Args)]
pub struct UserCommand {
    #[command(flatten)]
    pub source: SeedArgs,

    /// User id to resolve
    #[arg(short, long)]
    pub user: String,
}

#[derive(Debug, Serialize)]
struct UserReport {
    user: UserId,
    permissions: PermissionSet,
}

impl UserCommand {
    pub fn run(&self, json: bool) -> anyhow::Result<()> {
        let ctx = GraphContext::load(&self.source.seed, self.source.config.as_deref())?;
        let user = UserId::new(self.user.clone());
        let permissions = ctx.manager().get_user_permissions(&user)?;

        if json {
            return print_json(&UserReport { user, permissions });
        }

        println!("User {}", style(&user).cyan());
        print_permissions("Effective permissions", &permissions);
        Ok(())
    }
}
