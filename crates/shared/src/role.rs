//! Role types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Opaque role identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoleId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RoleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A single grantable capability (e.g. `post:write`)
///
/// Tokens carry no structure; two permissions are equal iff their strings are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Permission {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Permission {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Deduplicated, ordered set of permission tokens
pub type PermissionSet = BTreeSet<Permission>;

/// Build a [`PermissionSet`] from anything string-like
pub fn permission_set<I, P>(tokens: I) -> PermissionSet
where
    I: IntoIterator<Item = P>,
    P: Into<Permission>,
{
    tokens.into_iter().map(Into::into).collect()
}

/// A persisted role and its direct inheritance edges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Unique role identifier
    pub id: RoleId,

    /// Unique human-readable name
    pub name: String,

    /// Role description
    #[serde(default)]
    pub description: Option<String>,

    /// Directly assigned permissions
    #[serde(default)]
    pub permissions: PermissionSet,

    /// Roles this role inherits from, in declaration order
    #[serde(default)]
    pub inherits: Vec<RoleId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Create a new role with no permissions and no parents
    pub fn new(id: impl Into<RoleId>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            permissions: PermissionSet::new(),
            inherits: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: add a permission
    pub fn with_permission(mut self, permission: impl Into<Permission>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    /// Builder: add several permissions
    pub fn with_permissions<I, P>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        self.permissions.extend(permissions.into_iter().map(Into::into));
        self
    }

    /// Builder: append an inheritance edge
    pub fn inherits_from(mut self, parent: impl Into<RoleId>) -> Self {
        self.inherits.push(parent.into());
        self
    }

    /// Check if this role directly inherits from `parent`
    pub fn inherits_directly(&self, parent: &RoleId) -> bool {
        self.inherits.iter().any(|id| id == parent)
    }

    /// Check if the permission is assigned directly to this role
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p.as_str() == permission)
    }
}

/// Input for creating a role
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRole {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub permissions: PermissionSet,

    #[serde(default)]
    pub inherits: Vec<RoleId>,
}

impl NewRole {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_permission(mut self, permission: impl Into<Permission>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    pub fn with_permissions<I, P>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        self.permissions.extend(permissions.into_iter().map(Into::into));
        self
    }

    pub fn inherits_from(mut self, parent: impl Into<RoleId>) -> Self {
        self.inherits.push(parent.into());
        self
    }
}

/// Partial update of a role. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePatch {
    #[serde(default)]
    pub name: Option<String>,

    /// `Some(None)` clears the description
    #[serde(default)]
    pub description: Option<Option<String>>,

    #[serde(default)]
    pub permissions: Option<PermissionSet>,

    #[serde(default)]
    pub inherits: Option<Vec<RoleId>>,
}

impl RolePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn permissions<I, P>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        self.permissions = Some(permission_set(permissions));
        self
    }

    pub fn inherits(mut self, inherits: Vec<RoleId>) -> Self {
        self.inherits = Some(inherits);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.permissions.is_none()
            && self.inherits.is_none()
    }
}

/// Resolved inheritance view attached to a role on request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InheritanceDetails {
    /// Own permissions plus everything inherited
    pub all_permissions: PermissionSet,

    /// Permissions contributed by ancestors only
    pub inherited_permissions: PermissionSet,

    /// Longest inheritance chain below the role
    pub hierarchy_level: usize,

    /// Every transitively inherited role, each listed once
    pub ancestors: Vec<RoleId>,

    /// Number of users currently assigned the role
    pub assigned_users: usize,
}

/// Role projection returned by read operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDetails {
    #[serde(flatten)]
    pub role: Role,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub inheritance: Option<InheritanceDetails>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_set_deduplicates() {
        let set = permission_set(["post:write", "post:write", "post:read"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Permission::from("post:read")));
    }

    #[test]
    fn test_role_builder() {
        let role = Role::new("admin", "Admin")
            .with_description("Administrators")
            .with_permission("post:delete")
            .inherits_from("editor");

        assert_eq!(role.id, RoleId::new("admin"));
        assert!(role.has_permission("post:delete"));
        assert!(role.inherits_directly(&RoleId::new("editor")));
        assert!(!role.inherits_directly(&RoleId::new("viewer")));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(RoleId::generate(), RoleId::generate());
    }

    #[test]
    fn test_role_serializes_camel_case() {
        let role = Role::new("r1", "Reader").with_permission("post:read");
        let json = serde_json::to_value(&role).unwrap();

        assert_eq!(json["id"], "r1");
        assert_eq!(json["permissions"][0], "post:read");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(RolePatch::new().is_empty());
        assert!(!RolePatch::new().name("x").is_empty());
    }

    #[test]
    fn test_patch_deserializes_partial_json() {
        let patch: RolePatch = serde_json::from_str(r#"{"inherits": ["a", "b"]}"#).unwrap();
        assert!(patch.name.is_none());
        assert_eq!(
            patch.inherits,
            Some(vec![RoleId::new("a"), RoleId::new("b")])
        );
    }
}
