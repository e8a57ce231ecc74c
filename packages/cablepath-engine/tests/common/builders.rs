//! Test site builders
//!
//! `Site` applies every topology edit and immediately hands the emitted
//! events to its controller, the way an application layer would.

use cablepath_engine::{
    CableId, ConsistencyController, EndpointKind, EngineConfig, LinkStatus, MutationEvent,
    PathChangeSet, PathNode, PathResult, TerminationId, Topology,
};

pub fn t(id: u64) -> TerminationId {
    TerminationId(id)
}

pub fn tn(id: u64) -> PathNode {
    PathNode::Termination(TerminationId(id))
}

pub fn cn(id: u64) -> PathNode {
    PathNode::Cable(CableId(id))
}

pub fn ids(raw: &[u64]) -> Vec<TerminationId> {
    raw.iter().copied().map(TerminationId).collect()
}

/// Topology plus the controller tracking it
pub struct Site {
    pub topology: Topology,
    pub controller: ConsistencyController,
}

impl Default for Site {
    fn default() -> Self {
        Self::new()
    }
}

impl Site {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            topology: Topology::new(),
            controller: ConsistencyController::new(config),
        }
    }

    pub fn endpoint(&mut self, id: u64, name: &str) -> &mut Self {
        self.topology
            .add_endpoint(t(id), name, EndpointKind::Interface)
            .unwrap();
        self
    }

    pub fn rear(&mut self, id: u64, name: &str, positions: u16) -> &mut Self {
        self.topology.add_rear_port(t(id), name, positions).unwrap();
        self
    }

    pub fn front(&mut self, id: u64, name: &str, rear: u64, position: u16) -> PathChangeSet {
        let event = self
            .topology
            .add_front_port(t(id), name, t(rear), position)
            .unwrap();
        self.notify(event).unwrap()
    }

    pub fn connect(&mut self, cable: u64, a: &[u64], b: &[u64]) -> PathChangeSet {
        self.try_connect(cable, a, b).unwrap()
    }

    pub fn try_connect(&mut self, cable: u64, a: &[u64], b: &[u64]) -> PathResult<PathChangeSet> {
        let event = self
            .topology
            .connect(CableId(cable), &ids(a), &ids(b))
            .unwrap();
        self.notify(event)
    }

    /// Connect without telling the controller (bulk import)
    pub fn connect_raw(&mut self, cable: u64, a: &[u64], b: &[u64]) -> PathChangeSet {
        let event = self
            .topology
            .connect(CableId(cable), &ids(a), &ids(b))
            .unwrap()
            .into_raw();
        self.notify(event).unwrap()
    }

    pub fn delete_cable(&mut self, cable: u64) -> PathChangeSet {
        let event = self.topology.delete_cable(CableId(cable)).unwrap();
        self.notify(event).unwrap()
    }

    pub fn delete_cable_raw(&mut self, cable: u64) -> PathChangeSet {
        let event = self.topology.delete_cable(CableId(cable)).unwrap().into_raw();
        self.notify(event).unwrap()
    }

    pub fn set_status(&mut self, cable: u64, status: LinkStatus) -> PathChangeSet {
        let event = self
            .topology
            .set_cable_status(CableId(cable), status)
            .unwrap();
        self.notify(event).unwrap()
    }

    pub fn detach(&mut self, termination: u64) -> PathResult<PathChangeSet> {
        let event = self.topology.detach_termination(t(termination)).unwrap();
        self.notify(event)
    }

    pub fn notify(&self, event: MutationEvent) -> PathResult<PathChangeSet> {
        self.controller.handle(&self.topology, &event)
    }

    pub fn notify_all(&self, events: &[MutationEvent]) -> PathResult<PathChangeSet> {
        self.controller.handle_all(&self.topology, events)
    }

    /// E1 - C1 - F1/R1 - C2 - E2
    pub fn patch_panel() -> Self {
        let mut site = Self::new();
        site.patch_panel_into();
        site
    }

    pub fn patch_panel_into(&mut self) -> &mut Self {
        self.endpoint(1, "E1").endpoint(2, "E2").rear(20, "R1", 1);
        self.front(10, "F1", 20, 1);
        self.connect(1, &[1], &[10]);
        self.connect(2, &[20], &[2]);
        self
    }

    /// Two panels of `positions` ports joined by trunk cable 99
    ///
    /// E(p) - C(10+p) - FA(110+p) → RA(100) ═ 99 ═ RB(200) → FB(210+p) - C(20+p) - D(50+p)
    pub fn trunked_panels(positions: u16) -> Self {
        let mut site = Self::new();
        site.rear(100, "RA", positions).rear(200, "RB", positions);
        for p in 1..=positions as u64 {
            site.front(110 + p, &format!("FA{p}"), 100, p as u16);
            site.front(210 + p, &format!("FB{p}"), 200, p as u16);
            site.endpoint(p, &format!("E{p}"));
            site.endpoint(50 + p, &format!("D{p}"));
            site.connect(10 + p, &[p], &[110 + p]);
            site.connect(20 + p, &[210 + p], &[50 + p]);
        }
        site.connect(99, &[100], &[200]);
        site
    }
}
