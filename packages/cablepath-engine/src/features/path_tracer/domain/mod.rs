//! Path tracer domain models
//!
//! A `TracedPath` is the pure output of one trace: the hop sequence from the
//! origin set to wherever the signal stops, plus its termination state.

mod error;

pub use error::{PathError, PathResult};

use serde::{Deserialize, Serialize};

use crate::shared::models::{CableId, PathNode, TerminationId};

/// Default bound on the number of hops in a single trace
pub const DEFAULT_MAX_HOPS: usize = 512;

/// Result of tracing one origin set
///
/// `hops` alternates termination sets and cable sets, starting with the
/// origins. Each hop is a non-empty set (multi-conductor cables and fan-out
/// pass-throughs yield several nodes per hop).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracedPath {
    pub origins: Vec<TerminationId>,
    pub hops: Vec<Vec<PathNode>>,
    /// Endpoints the path resolved to; empty unless `is_complete`
    pub destinations: Vec<TerminationId>,
    /// Complete and every cable connected
    pub is_active: bool,
    /// Reached endpoint terminations
    pub is_complete: bool,
    /// Halted because the next hop could not be chosen unambiguously
    pub is_split: bool,
}

impl TracedPath {
    /// Flattened node sequence in traversal order
    pub fn nodes(&self) -> impl Iterator<Item = PathNode> + '_ {
        self.hops.iter().flatten().copied()
    }

    pub fn contains(&self, node: PathNode) -> bool {
        self.hops.iter().any(|hop| hop.contains(&node))
    }

    pub fn cables(&self) -> impl Iterator<Item = CableId> + '_ {
        self.nodes().filter_map(|n| n.as_cable())
    }

    pub fn last_hop(&self) -> Option<&[PathNode]> {
        self.hops.last().map(|h| h.as_slice())
    }

    /// Whether the path currently ends (dead end or split) at `node`
    pub fn ends_at(&self, node: PathNode) -> bool {
        self.last_hop().map(|h| h.contains(&node)).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TracedPath {
        TracedPath {
            origins: vec![TerminationId(1)],
            hops: vec![
                vec![PathNode::Termination(TerminationId(1))],
                vec![PathNode::Cable(CableId(1))],
                vec![PathNode::Termination(TerminationId(2))],
            ],
            destinations: vec![TerminationId(2)],
            is_active: true,
            is_complete: true,
            is_split: false,
        }
    }

    #[test]
    fn test_flattened_nodes() {
        let path = sample();
        let nodes: Vec<PathNode> = path.nodes().collect();
        assert_eq!(nodes.len(), 3);
        assert_eq!(path.cables().collect::<Vec<_>>(), vec![CableId(1)]);
    }

    #[test]
    fn test_ends_at() {
        let path = sample();
        assert!(path.ends_at(PathNode::Termination(TerminationId(2))));
        assert!(!path.ends_at(PathNode::Termination(TerminationId(1))));
        assert!(path.contains(PathNode::Cable(CableId(1))));
    }
}
