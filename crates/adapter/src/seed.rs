//! Seed import - Load a [`GraphSeed`] into in-memory stores
//!
//! Rows are written raw: no cycle or depth validation happens here, so a
//! corrupted snapshot is reproduced faithfully and can then be audited with
//! `CycleGuard::validate_all`.

use std::collections::{HashMap, HashSet};

use shared::{GraphSeed, RepositoryError, Role, RoleId, User, UserId};
use thiserror::Error;
use tracing::info;

use crate::repository::in_memory::{InMemoryRoleRepository, InMemoryUserRepository};

/// Errors raised while importing a seed
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Duplicate role name in seed: {0}")]
    DuplicateRoleName(String),

    #[error("Duplicate role id in seed: {0}")]
    DuplicateRoleId(String),

    #[error("'{referenced_by}' references unknown role '{name}'")]
    UnknownRole { referenced_by: String, name: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// What an import wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub roles: usize,
    pub users: usize,
    /// Role ids keyed by role name
    pub role_ids: HashMap<String, RoleId>,
}

impl SeedSummary {
    pub fn role_id(&self, name: &str) -> Option<&RoleId> {
        self.role_ids.get(name)
    }
}

/// Import a seed, resolving role names to ids
pub fn import_seed(
    seed: &GraphSeed,
    roles: &InMemoryRoleRepository,
    users: &InMemoryUserRepository,
) -> Result<SeedSummary, SeedError> {
    let mut role_ids: HashMap<String, RoleId> = HashMap::new();
    let mut taken: HashSet<RoleId> = HashSet::new();
    for entry in &seed.roles {
        let id = entry
            .id
            .as_deref()
            .map(RoleId::new)
            .unwrap_or_else(RoleId::generate);
        if !taken.insert(id.clone()) {
            return Err(SeedError::DuplicateRoleId(id.to_string()));
        }
        if role_ids.insert(entry.name.clone(), id).is_some() {
            return Err(SeedError::DuplicateRoleName(entry.name.clone()));
        }
    }

    let resolve = |referenced_by: &str, name: &str| -> Result<RoleId, SeedError> {
        role_ids
            .get(name)
            .cloned()
            .ok_or_else(|| SeedError::UnknownRole {
                referenced_by: referenced_by.to_string(),
                name: name.to_string(),
            })
    };

    for entry in &seed.roles {
        let mut role = Role::new(resolve(&entry.name, &entry.name)?, entry.name.clone())
            .with_permissions(entry.permissions.iter().map(String::as_str));
        role.description = entry.description.clone();
        for parent in &entry.inherits {
            role.inherits.push(resolve(&entry.name, parent)?);
        }
        roles.insert_unchecked(role)?;
    }

    for entry in &seed.users {
        let mut user = User::new(UserId::new(entry.id.clone()));
        for name in &entry.roles {
            user.roles.push(resolve(&entry.id, name)?);
        }
        if let Some(name) = &entry.role {
            user.role = Some(resolve(&entry.id, name)?);
        }
        users.insert(user)?;
    }

    info!(
        roles = seed.roles.len(),
        users = seed.users.len(),
        "Seed imported"
    );

    Ok(SeedSummary {
        roles: seed.roles.len(),
        users: seed.users.len(),
        role_ids,
    })
}
