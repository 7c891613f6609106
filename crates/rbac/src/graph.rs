//! Read views over the role graph
//!
//! Every traversal in this crate reads roles through [`RoleLookup`]. A plain
//! repository is a lookup; so is a [`StagedGraph`], which overlays roles that
//! have not been written yet so a mutation can be validated before commit.

use crate::repository::RoleRepository;
use shared::{RepositoryError, Role, RoleId};
use std::collections::{HashMap, HashSet};

/// Read access to roles by id
pub trait RoleLookup {
    /// Fetch a single role
    fn role(&self, id: &RoleId) -> Result<Option<Role>, RepositoryError>;

    /// Fetch several roles. Unknown ids are skipped.
    fn roles(&self, ids: &[RoleId]) -> Result<Vec<Role>, RepositoryError>;
}

impl<R: RoleRepository + ?Sized> RoleLookup for R {
    fn role(&self, id: &RoleId) -> Result<Option<Role>, RepositoryError> {
        self.find_by_id(id)
    }

    fn roles(&self, ids: &[RoleId]) -> Result<Vec<Role>, RepositoryError> {
        self.find_by_ids(ids)
    }
}

/// Persisted graph with pending role versions layered on top
#[derive(Debug)]
pub struct StagedGraph<'a, R: ?Sized> {
    store: &'a R,
    staged: HashMap<RoleId, Role>,
}

impl<'a, R: RoleRepository + ?Sized> StagedGraph<'a, R> {
    pub fn new(store: &'a R) -> Self {
        Self {
            store,
            staged: HashMap::new(),
        }
    }

    /// Builder: shadow the stored version of `role` (or add it if new)
    pub fn stage(mut self, role: Role) -> Self {
        self.staged.insert(role.id.clone(), role);
        self
    }

    pub fn is_staged(&self, id: &RoleId) -> bool {
        self.staged.contains_key(id)
    }
}

impl<R: RoleRepository + ?Sized> RoleLookup for StagedGraph<'_, R> {
    fn role(&self, id: &RoleId) -> Result<Option<Role>, RepositoryError> {
        match self.staged.get(id) {
            Some(role) => Ok(Some(role.clone())),
            None => self.store.find_by_id(id),
        }
    }

    fn roles(&self, ids: &[RoleId]) -> Result<Vec<Role>, RepositoryError> {
        let mut seen = HashSet::new();
        let mut roles = Vec::new();
        let mut unstaged = Vec::new();

        for id in ids {
            if !seen.insert(id) {
                continue;
            }
            match self.staged.get(id) {
                Some(role) => roles.push(role.clone()),
                None => unstaged.push(id.clone()),
            }
        }

        if !unstaged.is_empty() {
            roles.extend(self.store.find_by_ids(&unstaged)?);
        }
        Ok(roles)
    }
}
