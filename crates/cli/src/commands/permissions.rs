//! rolegraph permissions command

use clap::Args;
use console::style;
use shared::RoleDetails;

use super::{print_json, print_permissions, SeedArgs};
use crate::context::GraphContext;

#[derive(Debug, Args)]
pub struct PermissionsCommand {
    #[command(flatten)]
    pub source: SeedArgs,

    /// Role name to resolve
    #[arg(short, long)]
    pub role: String,
}

impl PermissionsCommand {
    pub fn run(&self, json: bool) -> anyhow::Result<()> {
        let ctx = GraphContext::load(&self.source.seed, self.source.config.as_deref())?;
        let details = role_details(&ctx, &self.role)?;

        if json {
            return print_json(&details);
        }

        let Some(inheritance) = &details.inheritance else {
            return Ok(());
        };
        let ancestors: Vec<String> = inheritance
            .ancestors
            .iter()
            .map(|id| ctx.role_name(id))
            .collect();

        println!(
            "Role {} (level {})",
            style(&details.role.name).cyan(),
            inheritance.hierarchy_level
        );
        if !ancestors.is_empty() {
            println!("Inherits from: {}", ancestors.join(", "));
        }
        println!("Assigned users: {}", inheritance.assigned_users);
        print_permissions("Own permissions", &details.role.permissions);
        print_permissions("Inherited permissions", &inheritance.inherited_permissions);
        print_permissions("All permissions", &inheritance.all_permissions);
        Ok(())
    }
}

/// Role projection with inheritance attached
pub fn role_details(ctx: &GraphContext, role_name: &str) -> anyhow::Result<RoleDetails> {
    let role_id = ctx.role_id(role_name)?;
    Ok(ctx.manager().get_role_by_id(&role_id, true)?)
}
