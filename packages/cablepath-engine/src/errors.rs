//! Error types for cablepath-engine
//!
//! Provides unified error handling across the crate.

use thiserror::Error;

use crate::config::ConfigError;
use crate::features::path_tracer::domain::PathError;
use crate::features::termination_graph::domain::TopologyError;

/// Main error type for engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// Path tracing or consistency cascade failure
    #[error(transparent)]
    Path(#[from] PathError),

    /// Rejected topology edit or unreadable snapshot
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Path errors describe bad topology data and never succeed on retry
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Path(err) => err.is_retryable(),
            EngineError::Io(_) => true,
            EngineError::Topology(_) | EngineError::Config(_) => false,
        }
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
