//! In-memory topology
//!
//! Reference implementation of `TerminationGraph`. Every edit is applied
//! first and then returned as the typed `MutationEvent`(s) the consistency
//! controller consumes, so the controller always reads the post-edit state.

use std::collections::BTreeMap;

use crate::features::consistency::domain::{
    CableDeleted, CableSaved, MutationEvent, PassThroughCreated, TerminationDeleted,
};
use crate::features::termination_graph::domain::{
    Cable, CableEnd, CableLink, EndpointKind, LinkStatus, Termination, TerminationKind,
    TopologyError, TopologyResult,
};
use crate::features::termination_graph::ports::TerminationGraph;
use crate::shared::models::{CableId, TerminationId};

/// Mutable topology with ordered storage (deterministic iteration)
#[derive(Debug, Clone, Default)]
pub struct Topology {
    terminations: BTreeMap<TerminationId, Termination>,
    cables: BTreeMap<CableId, Cable>,
    /// Rear port → (position → front port)
    fronts_by_rear: BTreeMap<TerminationId, BTreeMap<u16, TerminationId>>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn termination_count(&self) -> usize {
        self.terminations.len()
    }

    pub fn cable_count(&self) -> usize {
        self.cables.len()
    }

    pub fn terminations(&self) -> impl Iterator<Item = &Termination> {
        self.terminations.values()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Terminations
    // ═══════════════════════════════════════════════════════════════════════

    pub fn add_endpoint(
        &mut self,
        id: TerminationId,
        name: impl Into<String>,
        kind: EndpointKind,
    ) -> TopologyResult<()> {
        self.insert_termination(Termination::endpoint(id, name, kind))
    }

    pub fn add_rear_port(
        &mut self,
        id: TerminationId,
        name: impl Into<String>,
        positions: u16,
    ) -> TopologyResult<()> {
        if positions == 0 {
            return Err(TopologyError::InvalidPosition {
                rear_port: id,
                position: 0,
                positions,
            });
        }
        self.insert_termination(Termination::rear_port(id, name, positions))?;
        self.fronts_by_rear.entry(id).or_default();
        Ok(())
    }

    /// Add a front port mapped onto `position` of `rear_port`
    pub fn add_front_port(
        &mut self,
        id: TerminationId,
        name: impl Into<String>,
        rear_port: TerminationId,
        position: u16,
    ) -> TopologyResult<MutationEvent> {
        if self.terminations.contains_key(&id) {
            return Err(TopologyError::DuplicateTermination(id));
        }
        let rear = self
            .terminations
            .get(&rear_port)
            .ok_or(TopologyError::UnknownTermination(rear_port))?;
        let TerminationKind::RearPort { positions } = rear.kind else {
            return Err(TopologyError::NotARearPort(rear_port));
        };
        if position == 0 || position > positions {
            return Err(TopologyError::InvalidPosition {
                rear_port,
                position,
                positions,
            });
        }
        if let Some(existing) = self
            .fronts_by_rear
            .get(&rear_port)
            .and_then(|slots| slots.get(&position))
        {
            return Err(TopologyError::PositionOccupied {
                rear_port,
                position,
                front_port: *existing,
            });
        }

        let front = Termination::front_port(id, name, rear_port, position);
        self.insert_termination(front.clone())?;
        self.fronts_by_rear
            .entry(rear_port)
            .or_default()
            .insert(position, id);

        Ok(MutationEvent::PassThroughCreated(PassThroughCreated {
            front_port: front,
            raw: false,
        }))
    }

    /// Remove a termination, detaching it from its cable first
    pub fn remove_termination(&mut self, id: TerminationId) -> TopologyResult<Vec<MutationEvent>> {
        let (kind, linked) = self
            .terminations
            .get(&id)
            .map(|t| (t.kind, t.link.is_some()))
            .ok_or(TopologyError::UnknownTermination(id))?;

        if let TerminationKind::RearPort { .. } = kind {
            let mapped = self.fronts_by_rear.get(&id).map(|s| s.len()).unwrap_or(0);
            if mapped > 0 {
                return Err(TopologyError::RearPortInUse {
                    rear_port: id,
                    front_ports: mapped,
                });
            }
        }

        let mut events = Vec::new();
        if linked {
            events.push(self.detach_termination(id)?);
        }

        if let Some(removed) = self.terminations.remove(&id) {
            match removed.kind {
                TerminationKind::FrontPort {
                    rear_port,
                    rear_port_position,
                } => {
                    if let Some(slots) = self.fronts_by_rear.get_mut(&rear_port) {
                        slots.remove(&rear_port_position);
                    }
                }
                TerminationKind::RearPort { .. } => {
                    self.fronts_by_rear.remove(&id);
                }
                TerminationKind::Endpoint(_) => {}
            }
        }
        Ok(events)
    }

    fn insert_termination(&mut self, termination: Termination) -> TopologyResult<()> {
        if self.terminations.contains_key(&termination.id) {
            return Err(TopologyError::DuplicateTermination(termination.id));
        }
        self.terminations.insert(termination.id, termination);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Cables
    // ═══════════════════════════════════════════════════════════════════════

    /// Create a connected cable
    pub fn connect(
        &mut self,
        id: CableId,
        a: &[TerminationId],
        b: &[TerminationId],
    ) -> TopologyResult<MutationEvent> {
        self.create_cable(Cable::new(id, a.to_vec(), b.to_vec()))
    }

    /// Create a cable; one side may be empty (half-terminated cable)
    pub fn create_cable(&mut self, mut cable: Cable) -> TopologyResult<MutationEvent> {
        if self.cables.contains_key(&cable.id) {
            return Err(TopologyError::DuplicateCable(cable.id));
        }
        if cable.a_terminations.is_empty() && cable.b_terminations.is_empty() {
            return Err(TopologyError::EmptyCable(cable.id));
        }
        dedup_in_place(&mut cable.a_terminations);
        dedup_in_place(&mut cable.b_terminations);
        for end in [CableEnd::A, CableEnd::B] {
            for id in cable.terminations(end) {
                self.check_attachable(cable.id, *id, end, &cable)?;
            }
        }

        for end in [CableEnd::A, CableEnd::B] {
            for id in cable.terminations(end).to_vec() {
                self.link(id, cable.id, end);
            }
        }

        cable.dirty = true;
        let event = MutationEvent::CableSaved(CableSaved {
            previous: None,
            current: cable.clone(),
            raw: false,
        });
        cable.dirty = false;
        self.cables.insert(cable.id, cable);
        Ok(event)
    }

    pub fn set_cable_status(
        &mut self,
        id: CableId,
        status: LinkStatus,
    ) -> TopologyResult<MutationEvent> {
        let cable = self
            .cables
            .get_mut(&id)
            .ok_or(TopologyError::UnknownCable(id))?;
        let previous = cable.clone();
        cable.status = status;
        Ok(MutationEvent::CableSaved(CableSaved {
            previous: Some(previous),
            current: cable.clone(),
            raw: false,
        }))
    }

    /// Replace the termination set on one side of a cable
    ///
    /// Returns one `TerminationDeleted` per detached termination followed by
    /// the `CableSaved` for the cable itself.
    pub fn set_cable_terminations(
        &mut self,
        id: CableId,
        end: CableEnd,
        terminations: &[TerminationId],
    ) -> TopologyResult<Vec<MutationEvent>> {
        let mut wanted = terminations.to_vec();
        dedup_in_place(&mut wanted);

        let previous = self
            .cables
            .get(&id)
            .cloned()
            .ok_or(TopologyError::UnknownCable(id))?;
        if wanted.is_empty() && previous.terminations(end.opposite()).is_empty() {
            return Err(TopologyError::EmptyCable(id));
        }
        for tid in &wanted {
            self.check_attachable(id, *tid, end, &previous)?;
        }

        let mut events = Vec::new();
        let removed: Vec<TerminationId> = previous
            .terminations(end)
            .iter()
            .copied()
            .filter(|t| !wanted.contains(t))
            .collect();
        for tid in removed {
            events.push(self.detach_termination(tid)?);
        }

        for tid in &wanted {
            self.link(*tid, id, end);
        }
        let cable = self
            .cables
            .get_mut(&id)
            .ok_or(TopologyError::UnknownCable(id))?;
        *cable.terminations_mut(end) = wanted;
        cable.dirty = true;
        events.push(MutationEvent::CableSaved(CableSaved {
            previous: Some(previous),
            current: cable.clone(),
            raw: false,
        }));
        cable.dirty = false;
        Ok(events)
    }

    /// Detach a single termination from its cable; the cable survives
    pub fn detach_termination(&mut self, id: TerminationId) -> TopologyResult<MutationEvent> {
        let termination = self
            .terminations
            .get_mut(&id)
            .ok_or(TopologyError::UnknownTermination(id))?;
        let before = termination.clone();
        let link = termination
            .link
            .take()
            .ok_or(TopologyError::NotCabled(id))?;

        if let Some(cable) = self.cables.get_mut(&link.cable) {
            cable.terminations_mut(link.end).retain(|t| *t != id);
        }

        Ok(MutationEvent::TerminationDeleted(TerminationDeleted {
            termination: before,
            cable: link.cable,
            raw: false,
        }))
    }

    pub fn delete_cable(&mut self, id: CableId) -> TopologyResult<MutationEvent> {
        let cable = self
            .cables
            .remove(&id)
            .ok_or(TopologyError::UnknownCable(id))?;
        for tid in cable.all_terminations() {
            if let Some(termination) = self.terminations.get_mut(&tid) {
                termination.link = None;
            }
        }
        Ok(MutationEvent::CableDeleted(CableDeleted { cable, raw: false }))
    }

    fn check_attachable(
        &self,
        cable_id: CableId,
        tid: TerminationId,
        end: CableEnd,
        cable: &Cable,
    ) -> TopologyResult<()> {
        let termination = self
            .terminations
            .get(&tid)
            .ok_or(TopologyError::UnknownTermination(tid))?;
        if cable.terminations(end.opposite()).contains(&tid) {
            return Err(TopologyError::OverlappingSides {
                cable: cable_id,
                termination: tid,
            });
        }
        match termination.link {
            Some(link) if link.cable == cable_id && link.end == end => Ok(()),
            Some(link) => Err(TopologyError::AlreadyCabled {
                termination: tid,
                cable: link.cable,
            }),
            None => Ok(()),
        }
    }

    fn link(&mut self, tid: TerminationId, cable: CableId, end: CableEnd) {
        if let Some(termination) = self.terminations.get_mut(&tid) {
            termination.link = Some(CableLink { cable, end });
        }
    }
}

fn dedup_in_place(ids: &mut Vec<TerminationId>) {
    let mut seen = Vec::with_capacity(ids.len());
    ids.retain(|id| {
        if seen.contains(id) {
            false
        } else {
            seen.push(*id);
            true
        }
    });
}

impl TerminationGraph for Topology {
    fn termination(&self, id: TerminationId) -> Option<&Termination> {
        self.terminations.get(&id)
    }

    fn cable(&self, id: CableId) -> Option<&Cable> {
        self.cables.get(&id)
    }

    fn front_ports(&self, rear_port: TerminationId) -> Vec<&Termination> {
        self.fronts_by_rear
            .get(&rear_port)
            .map(|slots| {
                slots
                    .values()
                    .filter_map(|id| self.terminations.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn cables(&self) -> Vec<&Cable> {
        self.cables.values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(id: u64) -> TerminationId {
        TerminationId(id)
    }

    fn panel(topology: &mut Topology) {
        topology.add_rear_port(t(10), "rear1", 1).unwrap();
        topology.add_front_port(t(11), "front1", t(10), 1).unwrap();
    }

    #[test]
    fn test_connect_links_both_sides() {
        let mut topology = Topology::new();
        topology.add_endpoint(t(1), "eth0", EndpointKind::Interface).unwrap();
        topology.add_endpoint(t(2), "eth1", EndpointKind::Interface).unwrap();

        let event = topology.connect(CableId(1), &[t(1)], &[t(2)]).unwrap();
        match event {
            MutationEvent::CableSaved(saved) => {
                assert!(saved.created());
                assert!(saved.current.dirty);
            }
            other => panic!("unexpected event {other:?}"),
        }

        let a = topology.termination(t(1)).unwrap();
        assert_eq!(a.link, Some(CableLink { cable: CableId(1), end: CableEnd::A }));
        assert!(!topology.cable(CableId(1)).unwrap().dirty);
    }

    #[test]
    fn test_termination_occupied_by_one_cable() {
        let mut topology = Topology::new();
        topology.add_endpoint(t(1), "eth0", EndpointKind::Interface).unwrap();
        topology.add_endpoint(t(2), "eth1", EndpointKind::Interface).unwrap();
        topology.add_endpoint(t(3), "eth2", EndpointKind::Interface).unwrap();
        topology.connect(CableId(1), &[t(1)], &[t(2)]).unwrap();

        let err = topology.connect(CableId(2), &[t(1)], &[t(3)]).unwrap_err();
        assert!(matches!(err, TopologyError::AlreadyCabled { .. }));
    }

    #[test]
    fn test_sides_must_be_disjoint() {
        let mut topology = Topology::new();
        topology.add_endpoint(t(1), "eth0", EndpointKind::Interface).unwrap();
        let err = topology.connect(CableId(1), &[t(1)], &[t(1)]).unwrap_err();
        assert!(matches!(err, TopologyError::OverlappingSides { .. }));
    }

    #[test]
    fn test_front_port_position_checks() {
        let mut topology = Topology::new();
        panel(&mut topology);

        let err = topology.add_front_port(t(12), "front2", t(10), 2).unwrap_err();
        assert!(matches!(err, TopologyError::InvalidPosition { .. }));

        let err = topology.add_front_port(t(12), "front2", t(10), 1).unwrap_err();
        assert!(matches!(err, TopologyError::PositionOccupied { .. }));

        let err = topology.add_front_port(t(12), "front2", t(11), 1).unwrap_err();
        assert!(matches!(err, TopologyError::NotARearPort(_)));

        assert_eq!(topology.front_port_at(t(10), 1).map(|f| f.id), Some(t(11)));
    }

    #[test]
    fn test_set_cable_terminations_emits_detach_events_first() {
        let mut topology = Topology::new();
        for id in 1..=3 {
            topology.add_endpoint(t(id), format!("eth{id}"), EndpointKind::Interface).unwrap();
        }
        topology.connect(CableId(1), &[t(1)], &[t(2)]).unwrap();

        let events = topology
            .set_cable_terminations(CableId(1), CableEnd::B, &[t(3)])
            .unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], MutationEvent::TerminationDeleted(ref e) if e.termination.id == t(2)));
        assert!(matches!(events[1], MutationEvent::CableSaved(ref e) if e.terminations_modified()));

        assert_eq!(topology.termination(t(2)).unwrap().link, None);
        assert_eq!(topology.cable(CableId(1)).unwrap().b_terminations, vec![t(3)]);
    }

    #[test]
    fn test_delete_cable_clears_links() {
        let mut topology = Topology::new();
        topology.add_endpoint(t(1), "eth0", EndpointKind::Interface).unwrap();
        panel(&mut topology);
        topology.connect(CableId(1), &[t(1)], &[t(11)]).unwrap();

        let event = topology.delete_cable(CableId(1)).unwrap();
        assert_eq!(event.kind(), "cable_deleted");
        assert!(topology.termination(t(1)).unwrap().link.is_none());
        assert!(topology.termination(t(11)).unwrap().link.is_none());
        assert!(topology.cable(CableId(1)).is_none());
    }

    #[test]
    fn test_rear_port_in_use_cannot_be_removed() {
        let mut topology = Topology::new();
        panel(&mut topology);
        let err = topology.remove_termination(t(10)).unwrap_err();
        assert!(matches!(err, TopologyError::RearPortInUse { front_ports: 1, .. }));

        topology.remove_termination(t(11)).unwrap();
        topology.remove_termination(t(10)).unwrap();
        assert_eq!(topology.termination_count(), 0);
    }

    #[test]
    fn test_origin_sets_group_endpoint_sides() {
        let mut topology = Topology::new();
        topology.add_endpoint(t(1), "eth0", EndpointKind::Interface).unwrap();
        topology.add_endpoint(t(2), "eth1", EndpointKind::Interface).unwrap();
        panel(&mut topology);
        topology.connect(CableId(1), &[t(1), t(2)], &[t(11)]).unwrap();

        assert_eq!(topology.origin_sets(), vec![vec![t(1), t(2)]]);
    }
}
