//! Rolegraph CLI library
//!
//! Commands load a seed file into in-memory stores and query it through
//! the engine.

pub mod commands;
pub mod context;
