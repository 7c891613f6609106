//! User types
//!
//! Users are owned by the surrounding platform. The engine only reads
//! their role assignments.

use crate::role::RoleId;
use serde::{Deserialize, Serialize};

/// Opaque user identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Which user field counts as "assigned" when guarding role deletion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentCheck {
    /// Only the `roles` membership list
    Membership,
    /// Only the single legacy `role` field
    Legacy,
    /// Either field
    #[default]
    Both,
}

/// Projection of a platform user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,

    /// Assigned roles. No precedence between entries.
    #[serde(default)]
    pub roles: Vec<RoleId>,

    /// Legacy single-role field still populated by older records
    #[serde(default)]
    pub role: Option<RoleId>,
}

impl User {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            roles: Vec::new(),
            role: None,
        }
    }

    /// Builder: assign a role
    pub fn with_role(mut self, role_id: impl Into<RoleId>) -> Self {
        self.roles.push(role_id.into());
        self
    }

    /// Builder: set the legacy single-role field
    pub fn with_legacy_role(mut self, role_id: impl Into<RoleId>) -> Self {
        self.role = Some(role_id.into());
        self
    }

    /// Check whether the user holds `role_id` under the given check
    pub fn is_assigned(&self, role_id: &RoleId, check: AssignmentCheck) -> bool {
        let in_list = || self.roles.iter().any(|r| r == role_id);
        let in_legacy = || self.role.as_ref() == Some(role_id);

        match check {
            AssignmentCheck::Membership => in_list(),
            AssignmentCheck::Legacy => in_legacy(),
            AssignmentCheck::Both => in_list() || in_legacy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_checks() {
        let editor = RoleId::new("editor");
        let listed = User::new("u1").with_role("editor");
        let legacy = User::new("u2").with_legacy_role("editor");

        assert!(listed.is_assigned(&editor, AssignmentCheck::Membership));
        assert!(!listed.is_assigned(&editor, AssignmentCheck::Legacy));
        assert!(listed.is_assigned(&editor, AssignmentCheck::Both));

        assert!(!legacy.is_assigned(&editor, AssignmentCheck::Membership));
        assert!(legacy.is_assigned(&editor, AssignmentCheck::Legacy));
        assert!(legacy.is_assigned(&editor, AssignmentCheck::Both));
    }

    #[test]
    fn test_default_check_is_both() {
        assert_eq!(AssignmentCheck::default(), AssignmentCheck::Both);
    }
}
