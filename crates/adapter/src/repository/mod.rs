//! Persistence Adapters - Repository implementations
//!
//! These implement the repository traits from rbac.

pub mod in_memory;
