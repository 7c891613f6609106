//! Repository Traits - Storage ports for roles and users
//!
//! The engine only needs the queries below. Adapters decide how roles and
//! users are actually stored.
//!
//! ```text
//! Engine (rbac)             │  Adapter
//! ──────────────────────────┼────────────────────────
//! trait RoleRepository      │  InMemoryRoleRepository
//! trait UserRepository      │  InMemoryUserRepository
//! ```

use shared::{AssignmentCheck, RepositoryError, Role, RoleId, User, UserId};

/// Query filter for [`RoleRepository::find`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleFilter {
    /// Every stored role
    All,
    /// Roles whose `inherits` list contains the given id
    InheritsFrom(RoleId),
}

impl RoleFilter {
    pub fn matches(&self, role: &Role) -> bool {
        match self {
            RoleFilter::All => true,
            RoleFilter::InheritsFrom(parent) => role.inherits_directly(parent),
        }
    }
}

/// Role Repository Trait
///
/// Implementations must not validate the inheritance graph; that is the
/// engine's job.
pub trait RoleRepository {
    /// Find a role by ID
    fn find_by_id(&self, id: &RoleId) -> Result<Option<Role>, RepositoryError>;

    /// Find a role by its unique name
    fn find_by_name(&self, name: &str) -> Result<Option<Role>, RepositoryError>;

    /// Find every role whose id is listed. Unknown ids are skipped.
    fn find_by_ids(&self, ids: &[RoleId]) -> Result<Vec<Role>, RepositoryError>;

    /// Find roles matching a filter
    fn find(&self, filter: &RoleFilter) -> Result<Vec<Role>, RepositoryError>;

    /// Persist a new role
    fn create(&self, role: Role) -> Result<Role, RepositoryError>;

    /// Overwrite an existing role
    fn save(&self, role: &Role) -> Result<(), RepositoryError>;

    /// Delete a role, returning whether it existed
    fn delete_by_id(&self, id: &RoleId) -> Result<bool, RepositoryError>;

    /// Check if a role exists
    fn exists(&self, id: &RoleId) -> Result<bool, RepositoryError> {
        Ok(self.find_by_id(id)?.is_some())
    }
}

/// User Repository Trait
///
/// Users belong to the surrounding platform; the engine reads assignments only.
pub trait UserRepository {
    /// Find a user by ID
    fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;

    /// Count users holding `role_id` according to `check`
    fn count_assigned(
        &self,
        role_id: &RoleId,
        check: AssignmentCheck,
    ) -> Result<usize, RepositoryError>;
}
