//! CycleGuard - Keeps the inheritance graph acyclic
//!
//! Depth-first search with three node states. A node found again while it is
//! still on the current path closes a cycle; the cycle is cut out of the path
//! stack from that node onward. Fully explored nodes are never re-entered.

use crate::graph::RoleLookup;
use shared::{CircularInheritanceError, RbacError, Result, RoleId};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    /// On the current DFS path
    Visiting,
    /// Fully explored, no cycle below
    Visited,
}

/// Validates that no cycle is reachable from a role
#[derive(Debug)]
pub struct CycleGuard<'a, L: ?Sized> {
    roles: &'a L,
}

impl<'a, L: RoleLookup + ?Sized> CycleGuard<'a, L> {
    pub fn new(roles: &'a L) -> Self {
        Self { roles }
    }

    /// Fail with [`CircularInheritanceError`] if any cycle is reachable from `role_id`
    pub fn validate_no_cycle(&self, role_id: &RoleId) -> Result<()> {
        let mut states = HashMap::new();
        let mut path = Vec::new();
        self.visit(role_id, &mut states, &mut path)
    }

    /// Check every listed role, sharing visited state across starting points
    ///
    /// Used to audit a whole store. Reports the first cycle found.
    pub fn validate_all<'r, I>(&self, role_ids: I) -> Result<()>
    where
        I: IntoIterator<Item = &'r RoleId>,
    {
        let mut states = HashMap::new();
        let mut path = Vec::new();
        for role_id in role_ids {
            self.visit(role_id, &mut states, &mut path)?;
        }
        Ok(())
    }

    fn visit(
        &self,
        role_id: &RoleId,
        states: &mut HashMap<RoleId, VisitState>,
        path: &mut Vec<RoleId>,
    ) -> Result<()> {
        match states.get(role_id) {
            Some(VisitState::Visiting) => {
                return Err(self.cycle_error(role_id, path)?.into());
            }
            Some(VisitState::Visited) => return Ok(()),
            None => {}
        }

        let Some(role) = self.roles.role(role_id)? else {
            warn!(role_id = %role_id, "Inheritance edge points to a missing role");
            states.insert(role_id.clone(), VisitState::Visited);
            return Ok(());
        };

        states.insert(role_id.clone(), VisitState::Visiting);
        path.push(role_id.clone());

        for parent in &role.inherits {
            self.visit(parent, states, path)?;
        }

        path.pop();
        states.insert(role_id.clone(), VisitState::Visited);
        Ok(())
    }

    fn cycle_error(
        &self,
        closing: &RoleId,
        path: &[RoleId],
    ) -> std::result::Result<CircularInheritanceError, RbacError> {
        let start = path.iter().position(|id| id == closing).unwrap_or(0);
        let mut cycle = path[start..].to_vec();
        cycle.push(closing.clone());

        let mut names = Vec::with_capacity(cycle.len());
        for id in &cycle {
            let name = self
                .roles
                .role(id)?
                .map(|r| r.name)
                .unwrap_or_else(|| id.to_string());
            names.push(name);
        }

        debug!(cycle = %names.join(" -> "), "Inheritance cycle detected");
        Ok(CircularInheritanceError { cycle, names })
    }
}
