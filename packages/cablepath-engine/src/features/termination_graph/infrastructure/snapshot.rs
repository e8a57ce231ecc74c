//! Topology snapshot format (JSON / YAML)
//!
//! ```yaml
//! terminations:
//!   - { id: 1, name: eth0, kind: { endpoint: interface } }
//!   - { id: 10, name: rear1, kind: { rear_port: { positions: 1 } } }
//!   - { id: 11, name: front1, kind: { front_port: { rear_port: 10, rear_port_position: 1 } } }
//! cables:
//!   - { id: 100, a: [1], b: [11] }
//! ```
//!
//! Loading replays the snapshot into a fresh `Topology` (rear ports first,
//! then front ports, endpoints, cables) and drops the emitted events: a
//! loaded snapshot is traced with a full rebuild.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::in_memory::Topology;
use crate::features::termination_graph::domain::{
    Cable, LinkStatus, TerminationKind, TopologyResult,
};
use crate::features::termination_graph::ports::TerminationGraph;
use crate::shared::models::{CableId, TerminationId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TerminationSpec {
    pub id: TerminationId,
    #[serde(default)]
    pub name: String,
    pub kind: TerminationKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CableSpec {
    pub id: CableId,
    #[serde(default)]
    pub status: LinkStatus,
    #[serde(default)]
    pub a: Vec<TerminationId>,
    #[serde(default)]
    pub b: Vec<TerminationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopologySnapshot {
    #[serde(default)]
    pub terminations: Vec<TerminationSpec>,
    #[serde(default)]
    pub cables: Vec<CableSpec>,
}

impl TopologySnapshot {
    pub fn from_json_str(content: &str) -> TopologyResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_yaml_str(content: &str) -> TopologyResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load from a file; `.json` is parsed as JSON, anything else as YAML
    pub fn from_path(path: impl AsRef<Path>) -> TopologyResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    pub fn to_json(&self) -> TopologyResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Capture the current state of a topology
    pub fn capture(topology: &Topology) -> Self {
        let terminations = topology
            .terminations()
            .map(|t| TerminationSpec {
                id: t.id,
                name: t.name.clone(),
                kind: t.kind,
            })
            .collect();
        let cables = topology
            .cables()
            .into_iter()
            .map(|c| CableSpec {
                id: c.id,
                status: c.status,
                a: c.a_terminations.clone(),
                b: c.b_terminations.clone(),
                label: c.label.clone(),
            })
            .collect();
        Self {
            terminations,
            cables,
        }
    }

    pub fn into_topology(self) -> TopologyResult<Topology> {
        let mut topology = Topology::new();

        for spec in &self.terminations {
            if let TerminationKind::RearPort { positions } = spec.kind {
                topology.add_rear_port(spec.id, spec.name.clone(), positions)?;
            }
        }
        for spec in &self.terminations {
            if let TerminationKind::FrontPort {
                rear_port,
                rear_port_position,
            } = spec.kind
            {
                topology.add_front_port(spec.id, spec.name.clone(), rear_port, rear_port_position)?;
            }
        }
        for spec in &self.terminations {
            if let TerminationKind::Endpoint(kind) = spec.kind {
                topology.add_endpoint(spec.id, spec.name.clone(), kind)?;
            }
        }
        for spec in self.cables {
            let mut cable = Cable::new(spec.id, spec.a, spec.b).with_status(spec.status);
            cable.label = spec.label;
            topology.create_cable(cable)?;
        }

        Ok(topology)
    }
}
