//! Configuration and seed file types

use crate::error::ConfigError;
use crate::user::AssignmentCheck;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Reject edits that would push a role's hierarchy level above this
    #[serde(default)]
    pub max_hierarchy_depth: Option<usize>,

    /// User field consulted before a role may be deleted
    #[serde(default)]
    pub assignment_check: AssignmentCheck,
}

impl EngineConfig {
    /// Load configuration from a YAML or JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        load_file(path)
    }

    /// Builder: set the maximum hierarchy depth
    pub fn with_max_hierarchy_depth(mut self, depth: usize) -> Self {
        self.max_hierarchy_depth = Some(depth);
        self
    }

    /// Builder: set the assignment check
    pub fn with_assignment_check(mut self, check: AssignmentCheck) -> Self {
        self.assignment_check = check;
        self
    }
}

/// Role entry of a seed file. Parents are referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSeed {
    /// Fixed id; a random one is generated when absent
    #[serde(default)]
    pub id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub permissions: Vec<String>,

    #[serde(default)]
    pub inherits: Vec<String>,
}

/// User entry of a seed file. Roles are referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSeed {
    pub id: String,

    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(default)]
    pub role: Option<String>,
}

/// A role graph snapshot loaded from disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSeed {
    #[serde(default)]
    pub roles: Vec<RoleSeed>,

    #[serde(default)]
    pub users: Vec<UserSeed>,
}

impl GraphSeed {
    /// Load a seed from a YAML or JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        load_file(path)
    }

    /// Parse a YAML seed
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }
}

fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "yaml" | "yml" => Ok(serde_yaml::from_str(&content)?),
        "json" => Ok(serde_json::from_str(&content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}
