//! rolegraph check command

use clap::Args;
use console::style;
use serde::Serialize;

use super::{print_json, SeedArgs};
use crate::context::GraphContext;

#[derive(Debug, Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub source: SeedArgs,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckReport {
    roles: usize,
    acyclic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    cycle: Option<Vec<String>>,
}

impl CheckCommand {
    pub fn run(&self, json: bool) -> anyhow::Result<()> {
        let ctx = GraphContext::load(&self.source.seed, self.source.config.as_deref())?;
        let roles = ctx.manager().get_all_roles()?.len();
        let cycle = ctx.audit()?;

        if json {
            print_json(&CheckReport {
                roles,
                acyclic: cycle.is_none(),
                cycle: cycle.as_ref().map(|c| c.names.clone()),
            })?;
        } else if cycle.is_none() {
            println!("{} {} roles, no inheritance cycles", style("✓").green(), roles);
        }

        match cycle {
            Some(cycle) => Err(cycle.into()),
            None => Ok(()),
        }
    }
}
