//! Shared models

mod ids;

pub use ids::{CableId, PathId, PathNode, TerminationId};
