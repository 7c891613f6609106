//! rolegraph hierarchy command

use clap::Args;
use console::style;
use serde::Serialize;
use shared::RoleId;

use super::{print_json, SeedArgs};
use crate::context::GraphContext;

#[derive(Debug, Args)]
pub struct HierarchyCommand {
    #[command(flatten)]
    pub source: SeedArgs,
}

/// One line of the hierarchy listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyRow {
    pub id: RoleId,
    pub name: String,
    pub level: usize,
    pub inherits: Vec<String>,
}

impl HierarchyCommand {
    pub fn run(&self, json: bool) -> anyhow::Result<()> {
        let ctx = GraphContext::load(&self.source.seed, self.source.config.as_deref())?;
        let rows = hierarchy_rows(&ctx)?;

        if json {
            return print_json(&rows);
        }

        for row in &rows {
            let indent = "  ".repeat(row.level);
            if row.inherits.is_empty() {
                println!("{}{} {}", indent, style(format!("[{}]", row.level)).dim(), row.name);
            } else {
                println!(
                    "{}{} {} {} {}",
                    indent,
                    style(format!("[{}]", row.level)).dim(),
                    row.name,
                    style("<-").dim(),
                    row.inherits.join(", ")
                );
            }
        }
        Ok(())
    }
}

/// Every role with its hierarchy level, shallowest first then by name
pub fn hierarchy_rows(ctx: &GraphContext) -> anyhow::Result<Vec<HierarchyRow>> {
    let manager = ctx.manager();
    let mut rows = Vec::new();

    for role in manager.get_all_roles()? {
        rows.push(HierarchyRow {
            level: manager.get_role_hierarchy_level(&role.id)?,
            inherits: role.inherits.iter().map(|id| ctx.role_name(id)).collect(),
            id: role.id,
            name: role.name,
        });
    }

    rows.sort_by(|a, b| a.level.cmp(&b.level).then_with(|| a.name.cmp(&b.name)));
    Ok(rows)
}
