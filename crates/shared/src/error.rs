//! Error types for Rolegraph

use crate::role::RoleId;
use thiserror::Error;

/// Error raised when following `inherits` edges leads back to a role already on the path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Circular inheritance detected: {}", names.join(" -> "))]
pub struct CircularInheritanceError {
    /// Role ids along the cycle. The first and last entries are the same role.
    pub cycle: Vec<RoleId>,
    /// Role names matching `cycle`, position for position
    pub names: Vec<String>,
}

impl CircularInheritanceError {
    /// Role that closes the cycle
    pub fn origin(&self) -> Option<&RoleId> {
        self.cycle.first()
    }

    /// Number of distinct roles taking part in the cycle
    pub fn len(&self) -> usize {
        self.cycle.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Errors reported by role and user stores
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record '{id}' already exists")]
    DuplicateKey { id: String },

    #[error("Record '{id}' does not exist")]
    Missing { id: String },

    #[error("Persistence error: {message}")]
    Persistence { message: String },
}

/// Errors raised while loading configuration or seed files
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// General engine error type
#[derive(Debug, Error)]
pub enum RbacError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error(transparent)]
    CircularInheritance(#[from] CircularInheritanceError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl RbacError {
    pub fn role_not_found(id: &RoleId) -> Self {
        RbacError::NotFound {
            entity: "Role",
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        RbacError::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        RbacError::Validation {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RbacError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, RbacError::Conflict { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, RbacError::Validation { .. })
    }

    /// The detected cycle, if this error is a circular inheritance failure
    pub fn cycle(&self) -> Option<&CircularInheritanceError> {
        match self {
            RbacError::CircularInheritance(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RbacError>;
