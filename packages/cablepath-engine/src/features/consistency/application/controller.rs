//! Consistency controller
//!
//! Receives typed mutation events after the topology already reflects the
//! edit and brings the path index back in line with it.
//!
//! | Event                         | Action                                         |
//! |-------------------------------|------------------------------------------------|
//! | cable saved, sides changed    | endpoint side → trace fresh; pass-through side → retrace paths through it |
//! | cable saved, status only      | disconnected → deactivate; connected → retrace |
//! | cable deleted                 | retrace paths touching the cable               |
//! | termination deleted           | drop it from origins, retrace (one-hop fallback) |
//! | pass-through created          | retrace paths ending at the linked rear port   |
//!
//! Each event runs under the index write lock. Its index changes are staged
//! in an `IndexTransaction` and committed only when the whole cascade
//! succeeded.

use parking_lot::{RwLock, RwLockReadGuard};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::config::{EngineConfig, FallbackPolicy};
use crate::features::consistency::domain::{
    CableDeleted, CableSaved, MutationEvent, PassThroughCreated, TerminationDeleted,
};
use crate::features::path_index::domain::{CablePath, IndexStats, PathChangeSet};
use crate::features::path_index::infrastructure::{IndexTransaction, PathIndex};
use crate::features::path_tracer::domain::{PathError, PathResult, TracedPath};
use crate::features::path_tracer::infrastructure::PathTracer;
use crate::features::termination_graph::domain::{Cable, CableEnd, Termination, TerminationKind};
use crate::features::termination_graph::ports::TerminationGraph;
use crate::shared::models::{PathId, PathNode, TerminationId};

pub struct ConsistencyController {
    config: EngineConfig,
    index: RwLock<PathIndex>,
}

impl Default for ConsistencyController {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ConsistencyController {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_index(config, PathIndex::new())
    }

    /// Resume from a previously persisted index
    pub fn with_index(config: EngineConfig, index: PathIndex) -> Self {
        Self {
            config,
            index: RwLock::new(index),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read access to the index; events block while the guard is held
    pub fn index(&self) -> RwLockReadGuard<'_, PathIndex> {
        self.index.read()
    }

    pub fn into_index(self) -> PathIndex {
        self.index.into_inner()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    pub fn path(&self, id: PathId) -> Option<CablePath> {
        self.index.read().get(id).cloned()
    }

    /// Every stored path, ordered by id
    pub fn paths(&self) -> Vec<CablePath> {
        self.index.read().paths().into_iter().cloned().collect()
    }

    pub fn find_containing(&self, node: PathNode) -> Vec<CablePath> {
        let index = self.index.read();
        index
            .find_containing(node)
            .into_iter()
            .filter_map(|id| index.get(id).cloned())
            .collect()
    }

    pub fn find_containing_cable(&self, cable: &Cable) -> Vec<CablePath> {
        let index = self.index.read();
        index
            .find_containing_cable(cable)
            .into_iter()
            .filter_map(|id| index.get(id).cloned())
            .collect()
    }

    pub fn find_by_origin(&self, termination: TerminationId) -> Option<CablePath> {
        let index = self.index.read();
        let id = index.find_by_origin(termination).into_iter().next()?;
        index.get(id).cloned()
    }

    pub fn path_count(&self) -> usize {
        self.index.read().len()
    }

    pub fn stats(&self) -> IndexStats {
        self.index.read().stats()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Event handling
    // ═══════════════════════════════════════════════════════════════════════

    /// Apply one mutation event
    ///
    /// `graph` must already reflect the mutation. On error nothing from this
    /// event is committed.
    pub fn handle<G: TerminationGraph + ?Sized>(
        &self,
        graph: &G,
        event: &MutationEvent,
    ) -> PathResult<PathChangeSet> {
        if event.is_raw() {
            debug!("handle: skipping raw {} for {}", event.kind(), event.subject());
            return Ok(PathChangeSet::default());
        }

        let mut index = self.index.write();
        let staged = {
            let mut cascade = Cascade::new(graph, &index, &self.config);
            if let Err(err) = cascade.dispatch(event) {
                warn!(
                    "handle: {} for {} rolled back: {}",
                    event.kind(),
                    event.subject(),
                    err
                );
                return Err(err);
            }
            cascade.txn.into_staged()
        };
        let changes = index.commit(staged);

        debug!(
            "handle: {} for {} → {} created, {} updated, {} deactivated, {} deleted",
            event.kind(),
            event.subject(),
            changes.created.len(),
            changes.updated.len(),
            changes.deactivated.len(),
            changes.deleted.len()
        );
        Ok(changes)
    }

    /// Apply events in order, each committed on its own
    ///
    /// Stops at the first failing event; earlier events stay committed.
    pub fn handle_all<'e, G: TerminationGraph + ?Sized>(
        &self,
        graph: &G,
        events: impl IntoIterator<Item = &'e MutationEvent>,
    ) -> PathResult<PathChangeSet> {
        let mut changes = PathChangeSet::default();
        for event in events {
            changes.merge(self.handle(graph, event)?);
        }
        Ok(changes)
    }

    /// Re-trace every cabled endpoint and replace the index with the result
    ///
    /// Paths whose origin set is unchanged keep their id. Any trace error
    /// aborts the rebuild and leaves the current index in place.
    pub fn rebuild_all<G: TerminationGraph + Sync + ?Sized>(
        &self,
        graph: &G,
    ) -> PathResult<PathChangeSet> {
        let mut index = self.index.write();

        let origin_sets = graph.origin_sets();
        info!("rebuild_all: tracing {} origin sets", origin_sets.len());
        let tracer = PathTracer::new(graph).with_max_hops(self.config.max_hops);
        let traces = self.trace_all(&tracer, &origin_sets)?;

        let staged = {
            let mut by_origins: FxHashMap<Vec<TerminationId>, PathId> = index
                .iter()
                .map(|p| (sorted(p.origins()), p.id))
                .collect();
            let mut txn = IndexTransaction::new(&index);
            for trace in traces.into_iter().flatten() {
                match by_origins.remove(&sorted(&trace.origins)) {
                    Some(id) => txn.replace(id, trace),
                    None => {
                        txn.insert(trace);
                    }
                }
            }
            for stale in by_origins.into_values() {
                txn.remove(stale);
            }
            txn.into_staged()
        };
        let changes = index.commit(staged);

        info!(
            "rebuild_all: {} paths ({} created, {} updated, {} deleted)",
            index.len(),
            changes.created.len(),
            changes.updated.len() + changes.deactivated.len(),
            changes.deleted.len()
        );
        Ok(changes)
    }

    fn trace_all<G: TerminationGraph + Sync + ?Sized>(
        &self,
        tracer: &PathTracer<'_, G>,
        origin_sets: &[Vec<TerminationId>],
    ) -> PathResult<Vec<Option<TracedPath>>> {
        if self.config.parallel_rebuild && cfg!(feature = "parallel") {
            origin_sets
                .par_iter()
                .map(|origins| tracer.trace(origins))
                .collect()
        } else {
            origin_sets
                .iter()
                .map(|origins| tracer.trace(origins))
                .collect()
        }
    }
}

fn sorted(ids: &[TerminationId]) -> Vec<TerminationId> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids
}

// ═══════════════════════════════════════════════════════════════════════════
// Cascade: one event's worth of staged work
// ═══════════════════════════════════════════════════════════════════════════

struct Cascade<'a, G: TerminationGraph + ?Sized> {
    graph: &'a G,
    tracer: PathTracer<'a, G>,
    txn: IndexTransaction<'a>,
    config: &'a EngineConfig,
}

impl<'a, G: TerminationGraph + ?Sized> Cascade<'a, G> {
    fn new(graph: &'a G, index: &'a PathIndex, config: &'a EngineConfig) -> Self {
        Self {
            graph,
            tracer: PathTracer::new(graph).with_max_hops(config.max_hops),
            txn: IndexTransaction::new(index),
            config,
        }
    }

    fn dispatch(&mut self, event: &MutationEvent) -> PathResult<()> {
        match event {
            MutationEvent::CableSaved(e) => self.on_cable_saved(e),
            MutationEvent::CableDeleted(e) => self.on_cable_deleted(e),
            MutationEvent::TerminationDeleted(e) => self.on_termination_deleted(e),
            MutationEvent::PassThroughCreated(e) => self.on_pass_through_created(e),
        }
    }

    fn on_cable_saved(&mut self, event: &CableSaved) -> PathResult<()> {
        let cable = &event.current;

        if event.terminations_modified() {
            debug!("cable_saved: {} terminations modified", cable.id);
            for end in [CableEnd::A, CableEnd::B] {
                let terminations = cable.terminations(end);
                let Some(first) = terminations.first() else {
                    continue;
                };
                if self.termination(*first)?.kind.is_pass_through() {
                    let ids = self.paths_containing_any(terminations);
                    self.retrace_all(ids)?;
                } else {
                    self.trace_from(terminations)?;
                }
            }
            return Ok(());
        }

        if let Some((old, new)) = event.status_change() {
            let ids = self.txn.find_containing(PathNode::Cable(cable.id));
            debug!(
                "cable_saved: {} status {} → {} affects {} path(s)",
                cable.id,
                old.as_str(),
                new.as_str(),
                ids.len()
            );
            if new.is_connected() {
                self.retrace_all(ids)?;
            } else {
                for id in ids {
                    self.txn.deactivate(id);
                }
            }
        }
        Ok(())
    }

    fn on_cable_deleted(&mut self, event: &CableDeleted) -> PathResult<()> {
        let ids = self.txn.find_containing_cable(&event.cable);
        debug!("cable_deleted: {} touched {} path(s)", event.cable.id, ids.len());
        self.retrace_all(ids)
    }

    fn on_termination_deleted(&mut self, event: &TerminationDeleted) -> PathResult<()> {
        let deleted = event.termination.id;
        let mut ids = self.txn.find_containing(PathNode::Cable(event.cable));
        if ids.is_empty() && self.config.pass_through_fallback == FallbackPolicy::OneHop {
            ids = self.fallback_paths(&event.termination)?;
            if !ids.is_empty() {
                debug!(
                    "termination_deleted: {} found {} path(s) via paired face",
                    deleted,
                    ids.len()
                );
            }
        }

        for id in ids {
            let Some(path) = self.txn.get(id) else {
                continue;
            };
            let origins: Vec<TerminationId> = path
                .origins()
                .iter()
                .copied()
                .filter(|origin| *origin != deleted)
                .collect();
            self.retrace_from(id, &origins)?;
        }
        Ok(())
    }

    fn on_pass_through_created(&mut self, event: &PassThroughCreated) -> PathResult<()> {
        let TerminationKind::FrontPort { rear_port, .. } = event.front_port.kind else {
            return Ok(());
        };
        let ids = self.txn.find_ending_at(PathNode::Termination(rear_port));
        debug!(
            "pass_through_created: {} on {} resumes {} path(s)",
            event.front_port.id,
            rear_port,
            ids.len()
        );
        self.retrace_all(ids)
    }

    /// Paths reachable through the paired face of a deleted pass-through
    ///
    /// Looks exactly one hop across a single-position mapping. A fan-out
    /// mapping with paths ending next to it cannot be resolved by one lookup.
    fn fallback_paths(&self, termination: &Termination) -> PathResult<Vec<PathId>> {
        match termination.kind {
            TerminationKind::Endpoint(_) => Ok(Vec::new()),
            TerminationKind::RearPort { positions: 1 } => Ok(self
                .graph
                .front_port_at(termination.id, 1)
                .map(|front| self.txn.find_containing(PathNode::Termination(front.id)))
                .unwrap_or_default()),
            TerminationKind::RearPort { positions } => {
                let mut nearby: Vec<TerminationId> = self
                    .graph
                    .front_ports(termination.id)
                    .iter()
                    .map(|front| front.id)
                    .collect();
                nearby.push(termination.id);
                self.reject_fan_out(termination.id, positions, &nearby)
            }
            TerminationKind::FrontPort { rear_port, .. } => match self.termination(rear_port)?.kind {
                TerminationKind::RearPort { positions: 1 } => {
                    Ok(self.txn.find_containing(PathNode::Termination(rear_port)))
                }
                TerminationKind::RearPort { positions } => {
                    self.reject_fan_out(termination.id, positions, &[termination.id, rear_port])
                }
                _ => Err(PathError::inconsistent(
                    0,
                    format!("{} maps onto {} which is not a rear port", termination.id, rear_port),
                )),
            },
        }
    }

    fn reject_fan_out(
        &self,
        termination: TerminationId,
        positions: u16,
        nearby: &[TerminationId],
    ) -> PathResult<Vec<PathId>> {
        let mut candidates: Vec<PathId> = nearby
            .iter()
            .flat_map(|t| self.txn.find_ending_at(PathNode::Termination(*t)))
            .collect();
        candidates.sort_unstable();
        candidates.dedup();
        if candidates.is_empty() {
            Ok(candidates)
        } else {
            Err(PathError::AmbiguousFallback {
                termination,
                positions,
                candidates: candidates.len(),
            })
        }
    }

    /// Trace fresh from an endpoint side, replacing whatever path already
    /// originates at any of those terminations
    fn trace_from(&mut self, origins: &[TerminationId]) -> PathResult<()> {
        let existing = self.txn.find_by_origins(origins);
        let Some(trace) = self.tracer.trace(origins)? else {
            for id in existing {
                self.txn.remove(id);
            }
            return Ok(());
        };

        let mut existing = existing.into_iter();
        match existing.next() {
            Some(id) => {
                debug!("trace_from: {} retraced from {:?}", id, origins);
                self.txn.replace(id, trace);
            }
            None => {
                let id = self.txn.insert(trace);
                debug!("trace_from: {} created from {:?}", id, origins);
            }
        }
        for superseded in existing {
            self.txn.remove(superseded);
        }
        Ok(())
    }

    fn retrace_all(&mut self, ids: Vec<PathId>) -> PathResult<()> {
        for id in ids {
            let Some(path) = self.txn.get(id) else {
                continue;
            };
            let origins = path.origins().to_vec();
            self.retrace_from(id, &origins)?;
        }
        Ok(())
    }

    /// Re-run the tracer for `id`; an empty trace deletes the path
    fn retrace_from(&mut self, id: PathId, origins: &[TerminationId]) -> PathResult<()> {
        match self.tracer.trace(origins)? {
            Some(trace) => {
                debug!("retrace: {} → {} hops", id, trace.hops.len());
                self.txn.replace(id, trace);
            }
            None => {
                debug!("retrace: {} no longer traceable, removing", id);
                self.txn.remove(id);
            }
        }
        Ok(())
    }

    fn paths_containing_any(&self, terminations: &[TerminationId]) -> Vec<PathId> {
        let mut ids: Vec<PathId> = terminations
            .iter()
            .flat_map(|t| self.txn.find_containing(PathNode::Termination(*t)))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn termination(&self, id: TerminationId) -> PathResult<&'a Termination> {
        self.graph
            .termination(id)
            .ok_or(PathError::UnknownTermination(id))
    }
}
