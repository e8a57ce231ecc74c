//! Infrastructure - Topology adapters

pub mod in_memory;
pub mod snapshot;

pub use in_memory::Topology;
pub use snapshot::{CableSpec, TerminationSpec, TopologySnapshot};
