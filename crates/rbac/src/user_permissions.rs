//! UserPermissionAggregator - Effective permissions of a user

use crate::permission_resolver::PermissionResolver;
use crate::repository::{RoleRepository, UserRepository};
use shared::{PermissionSet, RbacError, Result, UserId};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Unions the resolved permissions of every role assigned to a user
///
/// An unknown user and a user without roles both resolve to an empty set.
#[derive(Debug)]
pub struct UserPermissionAggregator<'a, R: ?Sized, U: ?Sized> {
    roles: &'a R,
    users: &'a U,
}

impl<'a, R, U> UserPermissionAggregator<'a, R, U>
where
    R: RoleRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub fn new(roles: &'a R, users: &'a U) -> Self {
        Self { roles, users }
    }

    pub fn user_permissions(&self, user_id: &UserId) -> Result<PermissionSet> {
        let Some(user) = self.users.find_by_id(user_id)? else {
            debug!(user_id = %user_id, "Unknown user resolves to no permissions");
            return Ok(PermissionSet::new());
        };

        let resolver = PermissionResolver::new(self.roles);
        let mut permissions = PermissionSet::new();
        let mut seen = HashSet::new();

        for role_id in user.roles.iter().filter(|id| seen.insert(*id)) {
            match resolver.all_permissions(role_id) {
                Ok(role_permissions) => permissions.extend(role_permissions),
                Err(RbacError::NotFound { .. }) => {
                    warn!(user_id = %user_id, role_id = %role_id, "User holds a missing role");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(permissions)
    }
}
