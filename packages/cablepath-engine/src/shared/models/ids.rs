//! Identifiers shared by every feature
//!
//! Terminations, cables and paths are addressed by `u64` newtypes so the
//! compiler keeps them apart. `PathNode` is the unit stored in a path's hop
//! sequence and the key of the reverse index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Termination identifier (port, front port, rear port, ...)
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerminationId(pub u64);

/// Cable identifier
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CableId(pub u64);

/// Path identifier
///
/// Allocated monotonically by the path index and never reused, so external
/// references (audit links, persisted rows) stay valid across retraces.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathId(pub u64);

impl fmt::Display for TerminationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "termination#{}", self.0)
    }
}

impl fmt::Display for CableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cable#{}", self.0)
    }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "path#{}", self.0)
    }
}

/// A node on a cable path: either a termination or the cable between two
/// termination hops.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathNode {
    Termination(TerminationId),
    Cable(CableId),
}

impl PathNode {
    pub fn as_termination(&self) -> Option<TerminationId> {
        match self {
            PathNode::Termination(id) => Some(*id),
            PathNode::Cable(_) => None,
        }
    }

    pub fn as_cable(&self) -> Option<CableId> {
        match self {
            PathNode::Cable(id) => Some(*id),
            PathNode::Termination(_) => None,
        }
    }
}

impl From<TerminationId> for PathNode {
    fn from(id: TerminationId) -> Self {
        PathNode::Termination(id)
    }
}

impl From<CableId> for PathNode {
    fn from(id: CableId) -> Self {
        PathNode::Cable(id)
    }
}

impl fmt::Display for PathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathNode::Termination(id) => id.fmt(f),
            PathNode::Cable(id) => id.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_node_accessors() {
        let t = PathNode::from(TerminationId(7));
        let c = PathNode::from(CableId(3));

        assert_eq!(t.as_termination(), Some(TerminationId(7)));
        assert_eq!(t.as_cable(), None);
        assert_eq!(c.as_cable(), Some(CableId(3)));
        assert_eq!(c.as_termination(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(PathNode::Termination(TerminationId(1)).to_string(), "termination#1");
        assert_eq!(PathNode::Cable(CableId(2)).to_string(), "cable#2");
        assert_eq!(PathId(9).to_string(), "path#9");
    }

    #[test]
    fn test_path_node_serde() {
        let json = serde_json::to_string(&PathNode::Cable(CableId(4))).unwrap();
        assert_eq!(json, r#"{"cable":4}"#);

        let back: PathNode = serde_json::from_str(r#"{"termination":12}"#).unwrap();
        assert_eq!(back, PathNode::Termination(TerminationId(12)));
    }
}
