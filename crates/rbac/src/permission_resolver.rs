//! PermissionResolver - Effective permissions of a role
//!
//! Walks `inherits` edges recursively and unions every ancestor's own
//! permissions. Each branch carries its own copy of the visited ids, so a
//! corrupted (cyclic) store ends the branch instead of looping.

use crate::graph::RoleLookup;
use shared::{PermissionSet, RbacError, RepositoryError, Result, Role, RoleId};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct PermissionResolver<'a, L: ?Sized> {
    roles: &'a L,
}

impl<'a, L: RoleLookup + ?Sized> PermissionResolver<'a, L> {
    pub fn new(roles: &'a L) -> Self {
        Self { roles }
    }

    /// Permissions contributed by ancestors, excluding the role's own
    pub fn inherited_permissions(&self, role_id: &RoleId) -> Result<PermissionSet> {
        let role = self.load(role_id)?;
        Ok(self.inherited_from(&role)?)
    }

    /// Own permissions plus everything inherited
    pub fn all_permissions(&self, role_id: &RoleId) -> Result<PermissionSet> {
        let role = self.load(role_id)?;
        let mut permissions = self.inherited_from(&role)?;
        permissions.extend(role.permissions.iter().cloned());
        Ok(permissions)
    }

    /// Every role reachable through `inherits`, each listed once, in
    /// depth-first order. The role itself is excluded.
    pub fn ancestors(&self, role_id: &RoleId) -> Result<Vec<RoleId>> {
        let role = self.load(role_id)?;
        let mut seen = HashSet::from([role.id.clone()]);
        let mut ancestors = Vec::new();
        let mut stack: Vec<RoleId> = role.inherits.iter().rev().cloned().collect();

        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            let Some(parent) = self.roles.role(&id)? else {
                continue;
            };
            ancestors.push(parent.id.clone());
            stack.extend(parent.inherits.iter().rev().cloned());
        }

        Ok(ancestors)
    }

    fn load(&self, role_id: &RoleId) -> Result<Role> {
        self.roles
            .role(role_id)?
            .ok_or_else(|| RbacError::role_not_found(role_id))
    }

    fn inherited_from(&self, role: &Role) -> std::result::Result<PermissionSet, RepositoryError> {
        let visited = HashSet::from([role.id.clone()]);
        let mut resolved = HashMap::new();
        let (permissions, _) = self.collect(role, visited, &mut resolved)?;
        Ok(permissions)
    }

    /// Inherited permissions of `child`, plus whether a cycle cut shortened
    /// the result. Only uncut results go into `resolved`, since a cut result
    /// depends on the branch that reached it.
    fn collect(
        &self,
        child: &Role,
        visited: HashSet<RoleId>,
        resolved: &mut HashMap<RoleId, PermissionSet>,
    ) -> std::result::Result<(PermissionSet, bool), RepositoryError> {
        let mut permissions = PermissionSet::new();
        if child.inherits.is_empty() {
            return Ok((permissions, false));
        }

        let parents = self.roles.roles(&child.inherits)?;
        if parents.len() < child.inherits.len() {
            let found: HashSet<&RoleId> = parents.iter().map(|p| &p.id).collect();
            for missing in child.inherits.iter().filter(|id| !found.contains(id)) {
                warn!(role_id = %child.id, parent = %missing, "Skipping missing parent role");
            }
        }

        let mut cut = false;
        for parent in &parents {
            if visited.contains(&parent.id) {
                warn!(
                    role_id = %child.id,
                    parent = %parent.id,
                    "Inheritance cycle in stored graph, branch skipped"
                );
                cut = true;
                continue;
            }

            permissions.extend(parent.permissions.iter().cloned());

            if let Some(inherited) = resolved.get(&parent.id) {
                permissions.extend(inherited.iter().cloned());
                continue;
            }

            let mut branch = visited.clone();
            branch.insert(parent.id.clone());
            let (inherited, parent_cut) = self.collect(parent, branch, resolved)?;
            permissions.extend(inherited.iter().cloned());
            if parent_cut {
                cut = true;
            } else {
                resolved.insert(parent.id.clone(), inherited);
            }
        }

        debug!(role_id = %child.id, count = permissions.len(), "Collected inherited permissions");
        Ok((permissions, cut))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{diamond_ladder, MemoryRoles};
    use shared::{permission_set, Permission};

    fn id(s: &str) -> RoleId {
        RoleId::new(s)
    }

    fn diamond() -> MemoryRoles {
        // a -> [b, c], b -> d, c -> d
        MemoryRoles::with_roles([
            Role::new("d", "D").with_permission("base:read"),
            Role::new("b", "B").with_permission("b:write").inherits_from("d"),
            Role::new("c", "C").with_permission("c:write").inherits_from("d"),
            Role::new("a", "A")
                .with_permission("a:admin")
                .inherits_from("b")
                .inherits_from("c"),
        ])
    }

    #[test]
    fn test_no_parents_inherits_nothing() {
        let store = MemoryRoles::with_roles([Role::new("root", "Root").with_permission("x")]);
        let resolver = PermissionResolver::new(&store);

        assert!(resolver.inherited_permissions(&id("root")).unwrap().is_empty());
        assert_eq!(
            resolver.all_permissions(&id("root")).unwrap(),
            permission_set(["x"])
        );
    }

    #[test]
    fn test_editor_admin_scenario() {
        let store = MemoryRoles::with_roles([
            Role::new("editor", "Editor").with_permission("post:write"),
            Role::new("admin", "Admin")
                .with_permission("post:delete")
                .inherits_from("editor"),
        ]);
        let resolver = PermissionResolver::new(&store);

        assert_eq!(
            resolver.all_permissions(&id("admin")).unwrap(),
            permission_set(["post:write", "post:delete"])
        );
        assert_eq!(
            resolver.inherited_permissions(&id("admin")).unwrap(),
            permission_set(["post:write"])
        );
    }

    #[test]
    fn test_diamond_contributes_once() {
        let store = diamond();
        let all = PermissionResolver::new(&store)
            .all_permissions(&id("a"))
            .unwrap();

        assert_eq!(
            all,
            permission_set(["a:admin", "b:write", "c:write", "base:read"])
        );
        let base = Permission::from("base:read");
        assert_eq!(all.iter().filter(|p| **p == base).count(), 1);
    }

    #[test]
    fn test_inherited_excludes_own_permissions() {
        let store = diamond();
        let inherited = PermissionResolver::new(&store)
            .inherited_permissions(&id("a"))
            .unwrap();

        assert!(!inherited.contains(&Permission::from("a:admin")));
        assert_eq!(inherited.len(), 3);
    }

    #[test]
    fn test_all_is_superset_of_own() {
        let store = diamond();
        let resolver = PermissionResolver::new(&store);

        for role_id in ["a", "b", "c", "d"] {
            let role = store.role(&id(role_id)).unwrap().unwrap();
            let all = resolver.all_permissions(&id(role_id)).unwrap();
            assert!(all.is_superset(&role.permissions));
        }
    }

    #[test]
    fn test_parent_order_does_not_matter() {
        let forward = diamond();
        let reversed = diamond();
        reversed.insert(
            Role::new("a", "A")
                .with_permission("a:admin")
                .inherits_from("c")
                .inherits_from("b"),
        );

        assert_eq!(
            PermissionResolver::new(&forward).all_permissions(&id("a")).unwrap(),
            PermissionResolver::new(&reversed).all_permissions(&id("a")).unwrap()
        );
    }

    #[test]
    fn test_cyclic_store_terminates() {
        let store = MemoryRoles::with_roles([
            Role::new("a", "A").with_permission("a").inherits_from("b"),
            Role::new("b", "B").with_permission("b").inherits_from("c"),
            Role::new("c", "C").with_permission("c").inherits_from("a"),
        ]);
        let resolver = PermissionResolver::new(&store);

        assert_eq!(
            resolver.all_permissions(&id("a")).unwrap(),
            permission_set(["a", "b", "c"])
        );
        // the edge from c back to a is cut
        assert_eq!(
            resolver.inherited_permissions(&id("a")).unwrap(),
            permission_set(["b", "c"])
        );
    }

    #[test]
    fn test_self_reference_terminates() {
        let store = MemoryRoles::with_roles([Role::new("s", "S")
            .with_permission("s")
            .inherits_from("s")]);

        let resolver = PermissionResolver::new(&store);
        assert!(resolver.inherited_permissions(&id("s")).unwrap().is_empty());
    }

    #[test]
    fn test_missing_parent_is_skipped() {
        let store = MemoryRoles::with_roles([
            Role::new("base", "Base").with_permission("read"),
            Role::new("child", "Child")
                .inherits_from("ghost")
                .inherits_from("base"),
        ]);

        assert_eq!(
            PermissionResolver::new(&store)
                .inherited_permissions(&id("child"))
                .unwrap(),
            permission_set(["read"])
        );
    }

    #[test]
    fn test_unknown_role_is_not_found() {
        let store = MemoryRoles::default();
        let err = PermissionResolver::new(&store)
            .all_permissions(&id("ghost"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_ancestors_listed_once() {
        let store = diamond();
        let ancestors = PermissionResolver::new(&store).ancestors(&id("a")).unwrap();

        assert_eq!(ancestors, vec![id("b"), id("d"), id("c")]);
    }

    #[test]
    fn test_ancestors_in_cycle_exclude_self() {
        let store = MemoryRoles::with_roles([
            Role::new("a", "A").inherits_from("b"),
            Role::new("b", "B").inherits_from("a"),
        ]);
        assert_eq!(
            PermissionResolver::new(&store).ancestors(&id("a")).unwrap(),
            vec![id("b")]
        );
    }

    #[test]
    fn test_stacked_diamonds_resolve_each_role_once() {
        // 2^40 distinct paths from the top; only 81 roles
        let store = diamond_ladder(40);
        let resolver = PermissionResolver::new(&store);

        let all = resolver.all_permissions(&id("top")).unwrap();
        assert_eq!(all.len(), 81);
        assert!(all.contains(&Permission::from("p0a")));
        assert!(all.contains(&Permission::from("p39b")));
        assert!(all.contains(&Permission::from("top")));
        assert_eq!(resolver.inherited_permissions(&id("top")).unwrap().len(), 80);
    }

    #[test]
    fn test_shared_parent_inside_cycle() {
        // a -> [b, c], b -> c, c -> a
        let store = MemoryRoles::with_roles([
            Role::new("a", "A").with_permission("a").inherits_from("b").inherits_from("c"),
            Role::new("b", "B").with_permission("b").inherits_from("c"),
            Role::new("c", "C").with_permission("c").inherits_from("a"),
        ]);

        assert_eq!(
            PermissionResolver::new(&store)
                .inherited_permissions(&id("c"))
                .unwrap(),
            permission_set(["a", "b"])
        );
        assert_eq!(
            PermissionResolver::new(&store)
                .inherited_permissions(&id("a"))
                .unwrap(),
            permission_set(["b", "c"])
        );
    }
}
