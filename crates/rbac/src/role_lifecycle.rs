//! RoleLifecycleManager - Validated role mutations and read projections
//!
//! Edge changes are validated against a [`StagedGraph`] before anything is
//! written, so a rejected create/update leaves the store untouched. Mutations
//! through one manager are serialized; reads never take the lock.

use crate::cycle_guard::CycleGuard;
use crate::graph::StagedGraph;
use crate::hierarchy::HierarchyAnalyzer;
use crate::permission_resolver::PermissionResolver;
use crate::repository::{RoleFilter, RoleRepository, UserRepository};
use crate::user_permissions::UserPermissionAggregator;
use chrono::Utc;
use shared::{
    EngineConfig, InheritanceDetails, NewRole, PermissionSet, RbacError, RepositoryError, Result,
    Role, RoleDetails, RoleId, RolePatch, UserId,
};
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Entry point for role mutations and queries
///
/// Repositories are injected; the manager holds no graph state of its own.
///
/// The write lock belongs to the manager, not the store. Two managers over
/// handles that share storage (e.g. clones of an in-memory repository) do
/// not serialize against each other, so share one manager per store.
#[derive(Debug)]
pub struct RoleLifecycleManager<R, U> {
    roles: R,
    users: U,
    config: EngineConfig,
    write_lock: Mutex<()>,
}

impl<R: RoleRepository, U: UserRepository> RoleLifecycleManager<R, U> {
    /// Create a manager with default configuration
    pub fn new(roles: R, users: U) -> Self {
        Self::with_config(roles, users, EngineConfig::default())
    }

    pub fn with_config(roles: R, users: U, config: EngineConfig) -> Self {
        Self {
            roles,
            users,
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn role_repository(&self) -> &R {
        &self.roles
    }

    pub fn user_repository(&self) -> &U {
        &self.users
    }

    // ============== Mutations ==============

    /// Create a role
    ///
    /// # Errors
    ///
    /// - `Conflict` if the name is taken
    /// - `Validation` if the name or a permission is blank, a parent does not
    ///   exist, or the configured depth limit would be exceeded
    /// - `CircularInheritance` if the edges would close a cycle
    pub fn create_role(&self, input: NewRole) -> Result<Role> {
        let _guard = self.lock()?;

        let name = normalize_name(&input.name)?;
        if self.roles.find_by_name(&name)?.is_some() {
            return Err(RbacError::conflict(format!(
                "Role name '{}' already exists",
                name
            )));
        }

        let inherits = dedup_ids(input.inherits);
        self.ensure_roles_exist(&inherits)?;

        let mut role = Role::new(RoleId::generate(), name);
        role.description = input.description;
        role.permissions = normalize_permissions(input.permissions)?;
        role.inherits = inherits;

        if !role.inherits.is_empty() {
            self.validate_edges(&role)?;
        }

        let role = self.roles.create(role)?;
        info!(
            role_id = %role.id,
            name = %role.name,
            parents = role.inherits.len(),
            "Role created"
        );
        Ok(role)
    }

    /// Apply a partial update to a role
    ///
    /// # Errors
    ///
    /// - `NotFound` if the role does not exist
    /// - `Conflict` if the new name belongs to another role
    /// - `Validation` / `CircularInheritance` as for [`Self::create_role`]
    pub fn update_role(&self, role_id: &RoleId, patch: RolePatch) -> Result<Role> {
        let _guard = self.lock()?;

        let mut role = self
            .roles
            .find_by_id(role_id)?
            .ok_or_else(|| RbacError::role_not_found(role_id))?;

        if let Some(name) = patch.name {
            let name = normalize_name(&name)?;
            if name != role.name {
                if let Some(existing) = self.roles.find_by_name(&name)? {
                    if existing.id != role.id {
                        return Err(RbacError::conflict(format!(
                            "Role name '{}' already exists",
                            name
                        )));
                    }
                }
                role.name = name;
            }
        }

        if let Some(description) = patch.description {
            role.description = description;
        }

        if let Some(permissions) = patch.permissions {
            role.permissions = normalize_permissions(permissions)?;
        }

        let mut edges_changed = false;
        if let Some(inherits) = patch.inherits {
            let inherits = dedup_ids(inherits);
            if inherits != role.inherits {
                self.ensure_roles_exist(&inherits)?;
                role.inherits = inherits;
                edges_changed = true;
            }
        }

        if edges_changed {
            self.validate_edges(&role)?;
        }

        role.updated_at = Utc::now();
        self.roles.save(&role)?;
        info!(role_id = %role.id, name = %role.name, edges_changed, "Role updated");
        Ok(role)
    }

    /// Delete a role that nothing depends on
    ///
    /// # Errors
    ///
    /// - `NotFound` if the role does not exist
    /// - `Conflict` naming the dependents if other roles inherit from it
    /// - `Conflict` if any user is still assigned the role
    pub fn delete_role(&self, role_id: &RoleId) -> Result<Role> {
        let _guard = self.lock()?;

        let role = self
            .roles
            .find_by_id(role_id)?
            .ok_or_else(|| RbacError::role_not_found(role_id))?;

        let mut dependents: Vec<String> = self
            .roles
            .find(&RoleFilter::InheritsFrom(role_id.clone()))?
            .into_iter()
            .filter(|r| r.id != *role_id)
            .map(|r| r.name)
            .collect();
        if !dependents.is_empty() {
            dependents.sort();
            return Err(RbacError::conflict(format!(
                "Cannot delete role '{}': inherited by {}",
                role.name,
                dependents.join(", ")
            )));
        }

        let assigned = self
            .users
            .count_assigned(role_id, self.config.assignment_check)?;
        if assigned > 0 {
            return Err(RbacError::conflict(format!(
                "Cannot delete role '{}': assigned to {} user(s)",
                role.name, assigned
            )));
        }

        if !self.roles.delete_by_id(role_id)? {
            return Err(RbacError::role_not_found(role_id));
        }
        info!(role_id = %role.id, name = %role.name, "Role deleted");
        Ok(role)
    }

    // ============== Queries ==============

    /// All roles, ordered by name
    pub fn get_all_roles(&self) -> Result<Vec<Role>> {
        let mut roles = self.roles.find(&RoleFilter::All)?;
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    /// A single role, optionally with its resolved inheritance view
    pub fn get_role_by_id(&self, role_id: &RoleId, include_inheritance: bool) -> Result<RoleDetails> {
        let role = self
            .roles
            .find_by_id(role_id)?
            .ok_or_else(|| RbacError::role_not_found(role_id))?;

        let inheritance = if include_inheritance {
            let resolver = PermissionResolver::new(&self.roles);
            let inherited_permissions = resolver.inherited_permissions(role_id)?;
            let mut all_permissions = inherited_permissions.clone();
            all_permissions.extend(role.permissions.iter().cloned());

            Some(InheritanceDetails {
                all_permissions,
                inherited_permissions,
                hierarchy_level: HierarchyAnalyzer::new(&self.roles).hierarchy_level(role_id)?,
                ancestors: resolver.ancestors(role_id)?,
                assigned_users: self
                    .users
                    .count_assigned(role_id, self.config.assignment_check)?,
            })
        } else {
            None
        };

        Ok(RoleDetails { role, inheritance })
    }

    pub fn get_all_permissions(&self, role_id: &RoleId) -> Result<PermissionSet> {
        PermissionResolver::new(&self.roles).all_permissions(role_id)
    }

    pub fn get_inherited_permissions(&self, role_id: &RoleId) -> Result<PermissionSet> {
        PermissionResolver::new(&self.roles).inherited_permissions(role_id)
    }

    pub fn get_role_hierarchy_level(&self, role_id: &RoleId) -> Result<usize> {
        HierarchyAnalyzer::new(&self.roles).hierarchy_level(role_id)
    }

    pub fn get_user_permissions(&self, user_id: &UserId) -> Result<PermissionSet> {
        UserPermissionAggregator::new(&self.roles, &self.users).user_permissions(user_id)
    }

    // ============== Validation ==============

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| {
            RbacError::Repository(RepositoryError::Persistence {
                message: "Failed to acquire role mutation lock".to_string(),
            })
        })
    }

    fn ensure_roles_exist(&self, ids: &[RoleId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let found: HashSet<RoleId> = self
            .roles
            .find_by_ids(ids)?
            .into_iter()
            .map(|r| r.id)
            .collect();
        let missing: Vec<&str> = ids
            .iter()
            .filter(|id| !found.contains(*id))
            .map(|id| id.as_str())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(RbacError::validation(format!(
                "Inherited role(s) not found: {}",
                missing.join(", ")
            )))
        }
    }

    /// Check the prospective version of `role` before it is written
    fn validate_edges(&self, role: &Role) -> Result<()> {
        let graph = StagedGraph::new(&self.roles).stage(role.clone());
        CycleGuard::new(&graph).validate_no_cycle(&role.id)?;

        if let Some(max_depth) = self.config.max_hierarchy_depth {
            let analyzer = HierarchyAnalyzer::new(&graph);
            let mut affected = vec![role.clone()];
            affected.extend(self.descendants(&role.id)?);

            for candidate in &affected {
                let level = analyzer.level_of(candidate)?;
                if level > max_depth {
                    return Err(RbacError::validation(format!(
                        "Role '{}' would reach hierarchy level {} (maximum {})",
                        candidate.name, level, max_depth
                    )));
                }
            }
        }

        debug!(role_id = %role.id, "Inheritance edges validated");
        Ok(())
    }

    /// Every persisted role that inherits from `role_id`, directly or not
    fn descendants(&self, role_id: &RoleId) -> Result<Vec<Role>> {
        let mut seen = HashSet::from([role_id.clone()]);
        let mut queue = VecDeque::from([role_id.clone()]);
        let mut descendants = Vec::new();

        while let Some(current) = queue.pop_front() {
            for child in self.roles.find(&RoleFilter::InheritsFrom(current))? {
                if seen.insert(child.id.clone()) {
                    queue.push_back(child.id.clone());
                    descendants.push(child);
                }
            }
        }

        Ok(descendants)
    }
}

fn normalize_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RbacError::validation("Role name must not be empty"));
    }
    Ok(name.to_string())
}

fn normalize_permissions(permissions: PermissionSet) -> Result<PermissionSet> {
    let mut normalized = PermissionSet::new();
    for permission in permissions {
        let token = permission.as_str().trim();
        if token.is_empty() {
            return Err(RbacError::validation("Permission tokens must not be empty"));
        }
        normalized.insert(token.into());
    }
    Ok(normalized)
}

/// Drop repeated ids, keeping first occurrence
fn dedup_ids(ids: Vec<RoleId>) -> Vec<RoleId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
