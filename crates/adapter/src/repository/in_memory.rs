//! In-Memory Repository Implementations
//!
//! Simple in-memory implementations of the role and user repositories.
//! Useful for testing, development and the CLI.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rbac::repository::{RoleFilter, RoleRepository, UserRepository};
use shared::{AssignmentCheck, RepositoryError, Role, RoleId, User, UserId};

fn read_error() -> RepositoryError {
    RepositoryError::Persistence {
        message: "Failed to acquire read lock".to_string(),
    }
}

fn write_error() -> RepositoryError {
    RepositoryError::Persistence {
        message: "Failed to acquire write lock".to_string(),
    }
}

/// In-memory Role Repository
///
/// Thread-safe implementation using RwLock. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoleRepository {
    roles: Arc<RwLock<HashMap<RoleId, Role>>>,
}

impl InMemoryRoleRepository {
    pub fn new() -> Self {
        Self {
            roles: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Write a role as-is, replacing any row with the same id
    ///
    /// Bypasses every engine check. Meant for imports of existing data.
    pub fn insert_unchecked(&self, role: Role) -> Result<(), RepositoryError> {
        self.write()?.insert(role.id.clone(), role);
        Ok(())
    }

    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<RoleId, Role>>, RepositoryError> {
        self.roles.read().map_err(|_| read_error())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<RoleId, Role>>, RepositoryError> {
        self.roles.write().map_err(|_| write_error())
    }
}

impl RoleRepository for InMemoryRoleRepository {
    fn find_by_id(&self, id: &RoleId) -> Result<Option<Role>, RepositoryError> {
        Ok(self.read()?.get(id).cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Role>, RepositoryError> {
        Ok(self.read()?.values().find(|r| r.name == name).cloned())
    }

    fn find_by_ids(&self, ids: &[RoleId]) -> Result<Vec<Role>, RepositoryError> {
        let roles = self.read()?;
        let mut seen = HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(*id))
            .filter_map(|id| roles.get(id).cloned())
            .collect())
    }

    fn find(&self, filter: &RoleFilter) -> Result<Vec<Role>, RepositoryError> {
        Ok(self
            .read()?
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    fn create(&self, role: Role) -> Result<Role, RepositoryError> {
        let mut roles = self.write()?;
        if roles.contains_key(&role.id) {
            return Err(RepositoryError::DuplicateKey {
                id: role.id.to_string(),
            });
        }
        roles.insert(role.id.clone(), role.clone());
        Ok(role)
    }

    fn save(&self, role: &Role) -> Result<(), RepositoryError> {
        let mut roles = self.write()?;
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
        Ok(self.write()?.remove(id).is_some())
    }
}

/// In-memory User Repository
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert or replace a user
    pub fn insert(&self, user: User) -> Result<(), RepositoryError> {
        let mut users = self.users.write().map_err(|_| write_error())?;
        users.insert(user.id.clone(), user);
        Ok(())
    }

    /// Append a role to a user's membership list
    pub fn assign_role(&self, user_id: &UserId, role_id: RoleId) -> Result<(), RepositoryError> {
        let mut users = self.users.write().map_err(|_| write_error())?;
        let user = users.get_mut(user_id).ok_or_else(|| RepositoryError::Missing {
            id: user_id.to_string(),
        })?;
        if !user.roles.contains(&role_id) {
            user.roles.push(role_id);
        }
        Ok(())
    }

    pub fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let users = self.users.read().map_err(|_| read_error())?;
        Ok(users.values().cloned().collect())
    }
}

impl UserRepository for InMemoryUserRepository {
    fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().map_err(|_| read_error())?;
        Ok(users.get(id).cloned())
    }

    fn count_assigned(
        &self,
        role_id: &RoleId,
        check: AssignmentCheck,
    ) -> Result<usize, RepositoryError> {
        let users = self.users.read().map_err(|_| read_error())?;
        Ok(users
            .values()
            .filter(|u| u.is_assigned(role_id, check))
            .count())
    }
}
