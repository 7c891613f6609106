//! # Rolegraph Adapter Layer
//!
//! Implementations of the engine's storage ports.
//!
//! ## Structure
//!
//! - `repository/` - Persistence implementations
//! - `seed` - Raw import of role graph snapshots

pub mod repository;
pub mod seed;

pub use repository::in_memory::{InMemoryRoleRepository, InMemoryUserRepository};
pub use seed::{import_seed, SeedError, SeedSummary};
