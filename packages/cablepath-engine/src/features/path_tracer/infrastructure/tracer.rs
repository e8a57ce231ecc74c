//! Path tracer
//!
//! Walks from an origin set across cables and pass-through elements:
//!
//! 1. record the current termination set as a hop
//! 2. record the cable(s) occupying it (none → dead end)
//! 3. record the terminations on the far side (none → dead end)
//! 4. endpoints → complete; front ports → continue at their rear ports;
//!    rear ports → continue at the front port(s) selected by the position
//!    stack (empty stack on a multi-position rear port → split)
//!
//! Every node is visited at most once; a revisit is cyclic wiring and fails
//! with `PathError::PathLoop`. The tracer is pure: same origins against the
//! same topology always produce the same `TracedPath`.

use rustc_hash::FxHashSet;

use crate::features::path_tracer::domain::{PathError, PathResult, TracedPath, DEFAULT_MAX_HOPS};
use crate::features::termination_graph::domain::{
    Cable, NodeClass, Termination, TerminationKind,
};
use crate::features::termination_graph::ports::TerminationGraph;
use crate::shared::models::{PathNode, TerminationId};

/// Tracer bound to one topology view
pub struct PathTracer<'g, G: TerminationGraph + ?Sized> {
    graph: &'g G,
    max_hops: usize,
}

impl<'g, G: TerminationGraph + ?Sized> PathTracer<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            max_hops: DEFAULT_MAX_HOPS,
        }
    }

    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops.max(1);
        self
    }

    /// Trace from `origins`
    ///
    /// Returns `Ok(None)` when there is nothing to trace: no origins, or the
    /// origins are not attached to any cable.
    pub fn trace(&self, origins: &[TerminationId]) -> PathResult<Option<TracedPath>> {
        let mut current = self.resolve_all(&dedup(origins))?;
        if current.is_empty() {
            return Ok(None);
        }
        if let class @ (NodeClass::FrontPort | NodeClass::RearPort) = uniform_class(&current, 0)? {
            return Err(PathError::inconsistent(
                0,
                format!("paths originate at endpoints, not at a {class}"),
            ));
        }
        let origin_ids: Vec<TerminationId> = current.iter().map(|t| t.id).collect();

        let mut walk = Walk::new(self.max_hops);
        loop {
            walk.record(termination_nodes(&current))?;

            let cables = self.links(&current)?;
            if cables.is_empty() {
                if walk.hops.len() == 1 {
                    return Ok(None);
                }
                break;
            }
            walk.record(cables.iter().map(|c| PathNode::Cable(c.id)).collect())?;
            if cables.iter().any(|c| !c.is_connected()) {
                walk.cables_connected = false;
            }

            let remote = self.far_ends(&current)?;
            if remote.is_empty() {
                break;
            }
            let class = uniform_class(&remote, walk.hops.len())?;
            walk.record(termination_nodes(&remote))?;

            match class {
                NodeClass::Endpoint(_) => {
                    walk.destinations = remote.iter().map(|t| t.id).collect();
                    break;
                }
                NodeClass::FrontPort => {
                    current = self.enter_rear_ports(&remote, &mut walk)?;
                }
                NodeClass::RearPort => match self.exit_front_ports(&remote, &mut walk)? {
                    Exit::Continue(fronts) => current = fronts,
                    Exit::DeadEnd => break,
                    Exit::Split => {
                        walk.is_split = true;
                        break;
                    }
                },
            }
        }

        Ok(Some(walk.finish(origin_ids)))
    }

    fn resolve_all(&self, ids: &[TerminationId]) -> PathResult<Vec<&'g Termination>> {
        ids.iter()
            .map(|id| {
                self.graph
                    .termination(*id)
                    .ok_or(PathError::UnknownTermination(*id))
            })
            .collect()
    }

    /// Distinct cables attached to `terminations`, in first-seen order
    fn links(&self, terminations: &[&'g Termination]) -> PathResult<Vec<&'g Cable>> {
        let mut seen = FxHashSet::default();
        let mut cables = Vec::new();
        for cable_id in terminations.iter().filter_map(|t| t.cable()) {
            if seen.insert(cable_id) {
                let cable = self
                    .graph
                    .cable(cable_id)
                    .ok_or(PathError::UnknownCable(cable_id))?;
                cables.push(cable);
            }
        }
        Ok(cables)
    }

    /// Terminations on the opposite side of each near termination's cable
    fn far_ends(&self, near: &[&'g Termination]) -> PathResult<Vec<&'g Termination>> {
        let mut seen = FxHashSet::default();
        let mut far = Vec::new();
        for link in near.iter().filter_map(|t| t.link) {
            let cable = self
                .graph
                .cable(link.cable)
                .ok_or(PathError::UnknownCable(link.cable))?;
            for id in cable.terminations(link.end.opposite()) {
                if seen.insert(*id) {
                    far.push(
                        self.graph
                            .termination(*id)
                            .ok_or(PathError::UnknownTermination(*id))?,
                    );
                }
            }
        }
        Ok(far)
    }

    /// Front ports → rear ports, pushing positions when the rear side fans out
    fn enter_rear_ports(
        &self,
        fronts: &[&'g Termination],
        walk: &mut Walk,
    ) -> PathResult<Vec<&'g Termination>> {
        let mut rear_ids = Vec::new();
        let mut slots = Vec::new();
        for front in fronts {
            if let TerminationKind::FrontPort {
                rear_port,
                rear_port_position,
            } = front.kind
            {
                if !rear_ids.contains(&rear_port) {
                    rear_ids.push(rear_port);
                }
                slots.push(rear_port_position);
            }
        }

        let rears = self.resolve_all(&rear_ids)?;
        let mut fans_out = rears.len() > 1;
        for rear in &rears {
            match rear.kind {
                TerminationKind::RearPort { positions } => fans_out |= positions > 1,
                _ => {
                    return Err(PathError::inconsistent(
                        walk.hops.len(),
                        format!("front port maps onto {} which is a {}", rear.id, rear.class()),
                    ))
                }
            }
        }
        if fans_out {
            walk.position_stack.push(slots);
        }
        Ok(rears)
    }

    /// Rear ports → front ports, consuming the position stack
    fn exit_front_ports(&self, rears: &[&'g Termination], walk: &mut Walk) -> PathResult<Exit<'g>> {
        let single_position = rears.len() == 1
            && matches!(rears[0].kind, TerminationKind::RearPort { positions: 1 });

        let fronts: Vec<&'g Termination> = if single_position {
            self.graph.front_port_at(rears[0].id, 1).into_iter().collect()
        } else if let Some(positions) = walk.position_stack.pop() {
            rears
                .iter()
                .flat_map(|rear| {
                    positions
                        .iter()
                        .filter_map(move |p| self.graph.front_port_at(rear.id, *p))
                })
                .collect()
        } else {
            return Ok(Exit::Split);
        };

        if fronts.is_empty() {
            Ok(Exit::DeadEnd)
        } else {
            Ok(Exit::Continue(fronts))
        }
    }
}

enum Exit<'g> {
    Continue(Vec<&'g Termination>),
    DeadEnd,
    Split,
}

/// Mutable walk state for one trace
struct Walk {
    hops: Vec<Vec<PathNode>>,
    visited: FxHashSet<PathNode>,
    position_stack: Vec<Vec<u16>>,
    destinations: Vec<TerminationId>,
    cables_connected: bool,
    is_split: bool,
    max_hops: usize,
}

impl Walk {
    fn new(max_hops: usize) -> Self {
        Self {
            hops: Vec::new(),
            visited: FxHashSet::default(),
            position_stack: Vec::new(),
            destinations: Vec::new(),
            cables_connected: true,
            is_split: false,
            max_hops,
        }
    }

    fn record(&mut self, nodes: Vec<PathNode>) -> PathResult<()> {
        for node in &nodes {
            if !self.visited.insert(*node) {
                return Err(PathError::PathLoop {
                    node: *node,
                    hops: self.hops.len(),
                });
            }
        }
        if self.hops.len() >= self.max_hops {
            if let Some(node) = nodes.first() {
                return Err(PathError::PathLoop {
                    node: *node,
                    hops: self.hops.len(),
                });
            }
        }
        self.hops.push(nodes);
        Ok(())
    }

    fn finish(self, origins: Vec<TerminationId>) -> TracedPath {
        let is_complete = !self.destinations.is_empty();
        TracedPath {
            origins,
            hops: self.hops,
            destinations: self.destinations,
            is_active: is_complete && self.cables_connected,
            is_complete,
            is_split: self.is_split,
        }
    }
}

fn termination_nodes(terminations: &[&Termination]) -> Vec<PathNode> {
    terminations
        .iter()
        .map(|t| PathNode::Termination(t.id))
        .collect()
}

/// All terminations gathered in one step must share a node class
fn uniform_class(terminations: &[&Termination], hop: usize) -> PathResult<NodeClass> {
    let first = terminations[0].class();
    if let Some(other) = terminations
        .iter()
        .map(|t| t.class())
        .find(|class| *class != first)
    {
        return Err(PathError::inconsistent(
            hop,
            format!("mixed {first} and {other} terminations in one step"),
        ));
    }
    Ok(first)
}

fn dedup(ids: &[TerminationId]) -> Vec<TerminationId> {
    let mut seen = FxHashSet::default();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
