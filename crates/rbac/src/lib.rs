//! # Rolegraph RBAC
//!
//! Role inheritance and permission resolution over a persisted role graph.
//!
//! ## Components
//!
//! - `RoleRepository` / `UserRepository` - Storage ports implemented by adapters
//! - `CycleGuard` - Rejects inheritance edges that close a cycle
//! - `PermissionResolver` - Own + transitively inherited permissions of a role
//! - `HierarchyAnalyzer` - Longest inheritance chain below a role
//! - `UserPermissionAggregator` - Union of permissions over a user's roles
//! - `RoleLifecycleManager` - Validated create/update/delete and read projections
//!
//! Nothing here caches the graph. Every call re-reads the store.

pub mod repository;
pub mod graph;
pub mod cycle_guard;
pub mod permission_resolver;
pub mod hierarchy;
pub mod user_permissions;
pub mod role_lifecycle;

#[cfg(test)]
pub(crate) mod test_support;

pub use repository::{RoleFilter, RoleRepository, UserRepository};
pub use graph::{RoleLookup, StagedGraph};
pub use cycle_guard::CycleGuard;
pub use permission_resolver::PermissionResolver;
pub use hierarchy::HierarchyAnalyzer;
pub use user_permissions::UserPermissionAggregator;
pub use role_lifecycle::RoleLifecycleManager;
