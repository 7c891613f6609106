//! # Rolegraph Shared
//!
//! Common types used across all Rolegraph crates: the role/user vocabulary,
//! the error taxonomy and engine configuration.

pub mod error;
pub mod role;
pub mod user;
pub mod config;

// Re-exports
pub use error::*;
pub use role::*;
pub use user::*;
pub use config::*;
