//! HierarchyAnalyzer - Depth of a role in the inheritance graph

use crate::graph::RoleLookup;
use shared::{RbacError, RepositoryError, Result, Role, RoleId};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Computes hierarchy levels
///
/// `level(R) = 0` when R inherits nothing, otherwise
/// `1 + max(level(parent))`. A parent already on the current branch counts
/// as level 0, so a corrupted cyclic store still terminates.
#[derive(Debug)]
pub struct HierarchyAnalyzer<'a, L: ?Sized> {
    roles: &'a L,
}

impl<'a, L: RoleLookup + ?Sized> HierarchyAnalyzer<'a, L> {
    pub fn new(roles: &'a L) -> Self {
        Self { roles }
    }

    /// Length of the longest inheritance chain starting at `role_id`
    pub fn hierarchy_level(&self, role_id: &RoleId) -> Result<usize> {
        let role = self
            .roles
            .role(role_id)?
            .ok_or_else(|| RbacError::role_not_found(role_id))?;
        Ok(self.level_of(&role)?)
    }

    /// Level of a role value that may not be persisted yet
    pub fn level_of(&self, role: &Role) -> std::result::Result<usize, RepositoryError> {
        let mut resolved = HashMap::new();
        let (level, _) = self.level(role, HashSet::from([role.id.clone()]), &mut resolved)?;
        Ok(level)
    }

    /// Returns the level and whether a cycle cut shortened it. Only uncut
    /// levels are memoized in `resolved`.
    fn level(
        &self,
        role: &Role,
        visited: HashSet<RoleId>,
        resolved: &mut HashMap<RoleId, usize>,
    ) -> std::result::Result<(usize, bool), RepositoryError> {
        if role.inherits.is_empty() {
            return Ok((0, false));
        }

        let mut deepest: Option<usize> = None;
        let mut cut = false;
        for parent in self.roles.roles(&role.inherits)? {
            let depth = if visited.contains(&parent.id) {
                warn!(role_id = %role.id, parent = %parent.id, "Inheritance cycle in stored graph");
                cut = true;
                0
            } else if let Some(&known) = resolved.get(&parent.id) {
                known
            } else {
                let mut branch = visited.clone();
                branch.insert(parent.id.clone());
                let (depth, parent_cut) = self.level(&parent, branch, resolved)?;
                if parent_cut {
                    cut = true;
                } else {
                    resolved.insert(parent.id.clone(), depth);
                }
                depth
            };
            deepest = Some(deepest.map_or(depth, |d| d.max(depth)));
        }

        // only dangling parents: treated as a root
        Ok((deepest.map_or(0, |d| d + 1), cut))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{diamond_ladder, MemoryRoles};

    fn id(s: &str) -> RoleId {
        RoleId::new(s)
    }

    fn chain(n: usize) -> MemoryRoles {
        let store = MemoryRoles::default();
        store.insert(Role::new("r0", "R0"));
        for i in 1..=n {
            store.insert(
                Role::new(format!("r{i}"), format!("R{i}")).inherits_from(format!("r{}", i - 1)),
            );
        }
        store
    }

    #[test]
    fn test_root_is_level_zero() {
        let store = MemoryRoles::with_roles([Role::new("root", "Root")]);
        assert_eq!(
            HierarchyAnalyzer::new(&store).hierarchy_level(&id("root")).unwrap(),
            0
        );
    }

    #[test]
    fn test_linear_chain_depth() {
        let store = chain(5);
        let analyzer = HierarchyAnalyzer::new(&store);

        for i in 0..=5 {
            assert_eq!(analyzer.hierarchy_level(&id(&format!("r{i}"))).unwrap(), i);
        }
    }

    #[test]
    fn test_longest_branch_wins() {
        let store = chain(3);
        store.insert(Role::new("flat", "Flat"));
        store.insert(Role::new("top", "Top").inherits_from("flat").inherits_from("r3"));

        assert_eq!(
            HierarchyAnalyzer::new(&store).hierarchy_level(&id("top")).unwrap(),
            4
        );
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let store = chain(200);
        assert_eq!(
            HierarchyAnalyzer::new(&store).hierarchy_level(&id("r200")).unwrap(),
            200
        );
    }

    #[test]
    fn test_cycle_branch_counts_as_zero() {
        let store = MemoryRoles::with_roles([
            Role::new("a", "A").inherits_from("b"),
            Role::new("b", "B").inherits_from("a"),
        ]);

        // a -> b -> (a on branch: 0) => b = 1, a = 2
        assert_eq!(
            HierarchyAnalyzer::new(&store).hierarchy_level(&id("a")).unwrap(),
            2
        );
    }

    #[test]
    fn test_self_reference_terminates() {
        let store = MemoryRoles::with_roles([Role::new("s", "S").inherits_from("s")]);
        assert_eq!(
            HierarchyAnalyzer::new(&store).hierarchy_level(&id("s")).unwrap(),
            1
        );
    }

    #[test]
    fn test_only_missing_parents_is_root() {
        let store = MemoryRoles::with_roles([Role::new("orphan", "Orphan").inherits_from("ghost")]);
        assert_eq!(
            HierarchyAnalyzer::new(&store).hierarchy_level(&id("orphan")).unwrap(),
            0
        );
    }

    #[test]
    fn test_unknown_role_is_not_found() {
        let store = MemoryRoles::default();
        assert!(HierarchyAnalyzer::new(&store)
            .hierarchy_level(&id("ghost"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_stacked_diamonds_are_linear() {
        let store = diamond_ladder(40);
        let analyzer = HierarchyAnalyzer::new(&store);

        assert_eq!(analyzer.hierarchy_level(&id("top")).unwrap(), 40);
        assert_eq!(analyzer.hierarchy_level(&id("l39a")).unwrap(), 39);
        assert_eq!(analyzer.hierarchy_level(&id("l0b")).unwrap(), 0);
    }
}
