//! In-memory fakes for unit tests
//!
//! `insert` writes raw rows without any validation, which is how tests build
//! corrupted graphs (cycles, dangling edges).

use crate::repository::{RoleFilter, RoleRepository, UserRepository};
use shared::{AssignmentCheck, RepositoryError, Role, RoleId, User, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

#[derive(Debug, Default)]
pub(crate) struct MemoryRoles {
    roles: RwLock<HashMap<RoleId, Role>>,
}

impl MemoryRoles {
    pub(crate) fn with_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        let store = Self::default();
        for role in roles {
            store.insert(role);
        }
        store
    }

    pub(crate) fn insert(&self, role: Role) {
        self.roles.write().unwrap().insert(role.id.clone(), role);
    }

    pub(crate) fn len(&self) -> usize {
        self.roles.read().unwrap().len()
    }
}

/// Stacked diamonds: layer `i` holds `l{i}a` and `l{i}b`, each inheriting
/// both roles of layer `i - 1`, and `top` inherits both roles of the last
/// layer. Every role grants one permission named after it (`p{i}a`, `top`).
pub(crate) fn diamond_ladder(layers: usize) -> MemoryRoles {
    let store = MemoryRoles::default();
    for i in 0..layers {
        for side in ["a", "b"] {
            let mut role = Role::new(format!("l{i}{side}"), format!("L{i}{side}"))
                .with_permission(format!("p{i}{side}"));
            if i > 0 {
                role = role
                    .inherits_from(format!("l{}a", i - 1))
                    .inherits_from(format!("l{}b", i - 1));
            }
            store.insert(role);
        }
    }

    let mut top = Role::new("top", "Top").with_permission("top");
    if layers > 0 {
        top = top
            .inherits_from(format!("l{}a", layers - 1))
            .inherits_from(format!("l{}b", layers - 1));
    }
    store.insert(top);
    store
}

impl RoleRepository for MemoryRoles {
    fn find_by_id(&self, id: &RoleId) -> Result<Option<Role>, RepositoryError> {
        Ok(self.roles.read().unwrap().get(id).cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Role>, RepositoryError> {
        Ok(self
            .roles
            .read()
            .unwrap()
            .values()
            .find(|r| r.name == name)
            .cloned())
    }

    fn find_by_ids(&self, ids: &[RoleId]) -> Result<Vec<Role>, RepositoryError> {
        let roles = self.roles.read().unwrap();
        let mut seen = HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(*id))
            .filter_map(|id| roles.get(id).cloned())
            .collect())
    }

    fn find(&self, filter: &RoleFilter) -> Result<Vec<Role>, RepositoryError> {
        Ok(self
            .roles
            .read()
            .unwrap()
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    fn create(&self, role: Role) -> Result<Role, RepositoryError> {
        let mut roles = self.roles.write().unwrap();
        if roles.contains_key(&role.id) {
            return Err(RepositoryError::DuplicateKey {
                id: role.id.to_string(),
            });
        }
        roles.insert(role.id.clone(), role.clone());
        Ok(role)
    }

    fn save(&self, role: &Role) -> Result<(), RepositoryError> {
        let mut roles = self.roles.write().unwrap();
        match roles.get_mut(&role.id) {
            Some(existing) => {
                *existing = role.clone();
                Ok(())
            }
            None => Err(RepositoryError::Missing {
                id: role.id.to_string(),
            }),
        }
    }

    fn delete_by_id(&self, id: &RoleId) -> Result<bool, RepositoryError> {
        Ok(self.roles.write().unwrap().remove(id).is_some())
    }
}

#[derive(Debug, Default)]
pub(crate) struct MemoryUsers {
    users: RwLock<HashMap<UserId, User>>,
}

impl MemoryUsers {
    pub(crate) fn insert(&self, user: User) {
        self.users.write().unwrap().insert(user.id.clone(), user);
    }
}

impl UserRepository for MemoryUsers {
    fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().unwrap().get(id).cloned())
    }

    fn count_assigned(
        &self,
        role_id: &RoleId,
        check: AssignmentCheck,
    ) -> Result<usize, RepositoryError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .filter(|u| u.is_assigned(role_id, check))
            .count())
    }
}
