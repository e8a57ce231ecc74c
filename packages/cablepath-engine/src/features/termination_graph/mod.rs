/*
 * Termination Graph
 *
 * Read-only access to physical topology for the tracer and the
 * consistency controller.
 *
 * Architecture:
 * - Domain: Termination, TerminationKind, Cable, CableEnd, LinkStatus
 * - Ports: TerminationGraph (accessor trait)
 * - Infrastructure: in-memory Topology (emits mutation events), snapshots
 */

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{
    Cable, CableEnd, CableLink, EndpointKind, LinkStatus, NodeClass, PositionMapping,
    Termination, TerminationKind, TopologyError, TopologyResult,
};
pub use infrastructure::{Topology, TopologySnapshot};
pub use ports::TerminationGraph;
