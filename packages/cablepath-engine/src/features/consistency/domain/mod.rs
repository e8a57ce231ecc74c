//! Consistency domain
//!
//! - Typed mutation events consumed by the controller
//! - `PathChangeSet` reported back for every handled event

mod events;

pub use events::{CableDeleted, CableSaved, MutationEvent, PassThroughCreated, TerminationDeleted};

pub use crate::features::path_index::domain::PathChangeSet;
