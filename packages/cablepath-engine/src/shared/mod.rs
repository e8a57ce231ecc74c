//! Shared module - Common types
//!
//! Identifiers used across all features. No feature depends on another
//! feature's types for addressing nodes.

pub mod models;

pub use models::*;
