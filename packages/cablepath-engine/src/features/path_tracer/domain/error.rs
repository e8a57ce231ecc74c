//! Path domain errors
//!
//! All variants describe bad topology data, not transient failure. They are
//! never retried and always propagate to the caller of the mutation so the
//! edit can be rejected or flagged.

use thiserror::Error;

use crate::shared::models::{CableId, PathNode, TerminationId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Heterogeneous termination kinds reached in one traversal step
    #[error("Inconsistent path at hop {hop}: {reason}")]
    InconsistentPath { hop: usize, reason: String },

    /// Cyclic wiring (or a walk longer than the configured hop limit)
    #[error("Path loop detected at {node} after {hops} hops")]
    PathLoop { node: PathNode, hops: usize },

    /// Fan-out mapping met where a single-path fallback lookup was expected
    #[error(
        "Ambiguous pass-through fallback from {termination}: fan-out over {positions} positions \
         with {candidates} candidate path(s)"
    )]
    AmbiguousFallback {
        termination: TerminationId,
        positions: u16,
        candidates: usize,
    },

    #[error("Unknown termination: {0}")]
    UnknownTermination(TerminationId),

    #[error("Unknown cable: {0}")]
    UnknownCable(CableId),
}

impl PathError {
    pub fn inconsistent(hop: usize, reason: impl Into<String>) -> Self {
        PathError::InconsistentPath {
            hop,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PathError::InconsistentPath { .. } => "inconsistent_path",
            PathError::PathLoop { .. } => "path_loop",
            PathError::AmbiguousFallback { .. } => "ambiguous_fallback",
            PathError::UnknownTermination(_) => "unknown_termination",
            PathError::UnknownCable(_) => "unknown_cable",
        }
    }

    /// Topology errors never succeed on retry
    pub fn is_retryable(&self) -> bool {
        false
    }
}

pub type PathResult<T> = Result<T, PathError>;
