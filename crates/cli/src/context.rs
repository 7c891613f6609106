//! GraphContext - A seed loaded into a ready-to-query engine

use std::path::Path;

use adapter::{import_seed, InMemoryRoleRepository, InMemoryUserRepository, SeedSummary};
use anyhow::{anyhow, Context};
use rbac::{CycleGuard, RoleLifecycleManager};
use shared::{CircularInheritanceError, EngineConfig, GraphSeed, RbacError, RoleId};
use tracing::debug;

pub type Manager = RoleLifecycleManager<InMemoryRoleRepository, InMemoryUserRepository>;

#[derive(Debug)]
pub struct GraphContext {
    manager: Manager,
    summary: SeedSummary,
}

impl GraphContext {
    /// Load a seed file and optional engine config from disk
    pub fn load(seed_path: &Path, config_path: Option<&Path>) -> anyhow::Result<Self> {
        let seed = GraphSeed::from_file(seed_path)
            .with_context(|| format!("Failed to load seed {}", seed_path.display()))?;

        let config = match config_path {
            Some(path) => EngineConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => EngineConfig::default(),
        };

        Self::from_seed(&seed, config)
    }

    pub fn from_seed(seed: &GraphSeed, config: EngineConfig) -> anyhow::Result<Self> {
        let roles = InMemoryRoleRepository::new();
        let users = InMemoryUserRepository::new();
        let summary = import_seed(seed, &roles, &users)?;
        debug!(roles = summary.roles, users = summary.users, "Graph context ready");

        Ok(Self {
            manager: RoleLifecycleManager::with_config(roles, users, config),
            summary,
        })
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    /// Resolve a role name from the seed to its id
    pub fn role_id(&self, name: &str) -> anyhow::Result<RoleId> {
        self.summary
            .role_id(name)
            .cloned()
            .ok_or_else(|| anyhow!("Unknown role '{}'", name))
    }

    /// Display name for a role id, falling back to the id itself
    pub fn role_name(&self, id: &RoleId) -> String {
        self.summary
            .role_ids
            .iter()
            .find(|(_, role_id)| *role_id == id)
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Scan the whole graph for a cycle
    pub fn audit(&self) -> anyhow::Result<Option<CircularInheritanceError>> {
        let ids: Vec<RoleId> = self
            .manager
            .get_all_roles()?
            .into_iter()
            .map(|r| r.id)
            .collect();

        match CycleGuard::new(self.manager.role_repository()).validate_all(ids.iter()) {
            Ok(()) => Ok(None),
            Err(RbacError::CircularInheritance(cycle)) => Ok(Some(cycle)),
            Err(err) => Err(err.into()),
        }
    }
}
