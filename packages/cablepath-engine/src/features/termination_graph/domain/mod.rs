//! Termination graph domain models
//!
//! - `Termination`: a physical connection point with a closed `TerminationKind`
//! - `Cable`: an edge joining two disjoint termination sets (side A, side B)
//! - `TopologyError`: rejected topology edits
//!
//! Node dispatch is a closed enum. Capability queries (`is_origin_capable`,
//! `linked_positions`) are resolved by `match`, never by type inspection.

mod error;

pub use error::{TopologyError, TopologyResult};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::models::{CableId, TerminationId};

// ═══════════════════════════════════════════════════════════════════════════
// Termination kinds
// ═══════════════════════════════════════════════════════════════════════════

/// Origin-capable endpoint types
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    Interface,
    ConsolePort,
    ConsoleServerPort,
    PowerPort,
    PowerOutlet,
    PowerFeed,
    CircuitTermination,
}

impl EndpointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointKind::Interface => "interface",
            EndpointKind::ConsolePort => "console_port",
            EndpointKind::ConsoleServerPort => "console_server_port",
            EndpointKind::PowerPort => "power_port",
            EndpointKind::PowerOutlet => "power_outlet",
            EndpointKind::PowerFeed => "power_feed",
            EndpointKind::CircuitTermination => "circuit_termination",
        }
    }
}

/// Termination kind (closed set)
///
/// Front and rear ports are the two faces of a pass-through element. A front
/// port is mapped onto exactly one position of one rear port; a rear port
/// with more than one position fans out to several front ports.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationKind {
    /// Origin-capable endpoint
    Endpoint(EndpointKind),

    /// Front face of a pass-through element
    FrontPort {
        rear_port: TerminationId,
        /// 1-based position on `rear_port`
        rear_port_position: u16,
    },

    /// Rear face of a pass-through element
    RearPort { positions: u16 },
}

/// Coarse node class used for homogeneity checks on a termination set
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum NodeClass {
    Endpoint(EndpointKind),
    FrontPort,
    RearPort,
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeClass::Endpoint(kind) => f.write_str(kind.as_str()),
            NodeClass::FrontPort => f.write_str("front_port"),
            NodeClass::RearPort => f.write_str("rear_port"),
        }
    }
}

/// Position mapping of a termination onto the opposite face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionMapping {
    /// Endpoints relay nothing
    None,
    /// Front port → one position of a rear port
    ToRear {
        rear_port: TerminationId,
        position: u16,
    },
    /// Rear port → `positions` front-port slots
    ToFront { positions: u16 },
}

impl TerminationKind {
    pub fn interface() -> Self {
        TerminationKind::Endpoint(EndpointKind::Interface)
    }

    /// Whether a path may start or end at this termination
    pub fn is_origin_capable(&self) -> bool {
        matches!(self, TerminationKind::Endpoint(_))
    }

    pub fn is_pass_through(&self) -> bool {
        !self.is_origin_capable()
    }

    pub fn class(&self) -> NodeClass {
        match self {
            TerminationKind::Endpoint(kind) => NodeClass::Endpoint(*kind),
            TerminationKind::FrontPort { .. } => NodeClass::FrontPort,
            TerminationKind::RearPort { .. } => NodeClass::RearPort,
        }
    }

    pub fn linked_positions(&self) -> PositionMapping {
        match self {
            TerminationKind::Endpoint(_) => PositionMapping::None,
            TerminationKind::FrontPort {
                rear_port,
                rear_port_position,
            } => PositionMapping::ToRear {
                rear_port: *rear_port,
                position: *rear_port_position,
            },
            TerminationKind::RearPort { positions } => PositionMapping::ToFront {
                positions: *positions,
            },
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Cable ends and status
// ═══════════════════════════════════════════════════════════════════════════

/// Logical side of a cable
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum CableEnd {
    A,
    B,
}

impl CableEnd {
    pub fn opposite(&self) -> Self {
        match self {
            CableEnd::A => CableEnd::B,
            CableEnd::B => CableEnd::A,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CableEnd::A => "A",
            CableEnd::B => "B",
        }
    }
}

/// Cable connection status
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    #[default]
    Connected,
    Planned,
    Decommissioning,
}

impl LinkStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, LinkStatus::Connected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Connected => "connected",
            LinkStatus::Planned => "planned",
            LinkStatus::Decommissioning => "decommissioning",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "connected" => Some(LinkStatus::Connected),
            "planned" => Some(LinkStatus::Planned),
            "decommissioning" => Some(LinkStatus::Decommissioning),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Termination
// ═══════════════════════════════════════════════════════════════════════════

/// Occupancy of a termination: which cable, which side
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CableLink {
    pub cable: CableId,
    pub end: CableEnd,
}

/// Physical connection point
///
/// A termination is occupied by at most one cable; `link` records which
/// cable and which side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Termination {
    pub id: TerminationId,
    pub name: String,
    pub kind: TerminationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<CableLink>,
}

impl Termination {
    pub fn new(id: TerminationId, name: impl Into<String>, kind: TerminationKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            link: None,
        }
    }

    pub fn endpoint(id: TerminationId, name: impl Into<String>, kind: EndpointKind) -> Self {
        Self::new(id, name, TerminationKind::Endpoint(kind))
    }

    pub fn front_port(
        id: TerminationId,
        name: impl Into<String>,
        rear_port: TerminationId,
        rear_port_position: u16,
    ) -> Self {
        Self::new(
            id,
            name,
            TerminationKind::FrontPort {
                rear_port,
                rear_port_position,
            },
        )
    }

    pub fn rear_port(id: TerminationId, name: impl Into<String>, positions: u16) -> Self {
        Self::new(id, name, TerminationKind::RearPort { positions })
    }

    pub fn cable(&self) -> Option<CableId> {
        self.link.map(|l| l.cable)
    }

    pub fn is_origin_capable(&self) -> bool {
        self.kind.is_origin_capable()
    }

    pub fn class(&self) -> NodeClass {
        self.kind.class()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Cable
// ═══════════════════════════════════════════════════════════════════════════

/// Cable joining two disjoint termination sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cable {
    pub id: CableId,
    #[serde(default)]
    pub status: LinkStatus,
    #[serde(default)]
    pub a_terminations: Vec<TerminationId>,
    #[serde(default)]
    pub b_terminations: Vec<TerminationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Terminations changed since the last notification
    #[serde(skip)]
    pub dirty: bool,
}

impl Cable {
    pub fn new(
        id: CableId,
        a_terminations: Vec<TerminationId>,
        b_terminations: Vec<TerminationId>,
    ) -> Self {
        Self {
            id,
            status: LinkStatus::Connected,
            a_terminations,
            b_terminations,
            label: None,
            dirty: false,
        }
    }

    pub fn with_status(mut self, status: LinkStatus) -> Self {
        self.status = status;
        self
    }

    pub fn terminations(&self, end: CableEnd) -> &[TerminationId] {
        match end {
            CableEnd::A => &self.a_terminations,
            CableEnd::B => &self.b_terminations,
        }
    }

    pub fn terminations_mut(&mut self, end: CableEnd) -> &mut Vec<TerminationId> {
        match end {
            CableEnd::A => &mut self.a_terminations,
            CableEnd::B => &mut self.b_terminations,
        }
    }

    /// All terminations, side A first
    pub fn all_terminations(&self) -> impl Iterator<Item = TerminationId> + '_ {
        self.a_terminations
            .iter()
            .chain(self.b_terminations.iter())
            .copied()
    }

    pub fn is_connected(&self) -> bool {
        self.status.is_connected()
    }

    /// Whether both sides hold the same termination sets as `other`
    pub fn same_terminations(&self, other: &Cable) -> bool {
        let sorted = |v: &[TerminationId]| {
            let mut v = v.to_vec();
            v.sort_unstable();
            v
        };
        sorted(&self.a_terminations) == sorted(&other.a_terminations)
            && sorted(&self.b_terminations) == sorted(&other.b_terminations)
    }
}
