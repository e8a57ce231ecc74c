//! Staged index mutations
//!
//! An `IndexTransaction` is an overlay over a borrowed `PathIndex`: reads
//! merge the base index with pending upserts and removals, writes touch only
//! the overlay. `into_staged()` turns the overlay into a `StagedChanges`
//! value that `PathIndex::commit` applies in one step. Dropping either
//! without committing leaves the base index untouched.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::features::path_index::domain::{CablePath, PathChangeSet};
use crate::features::path_index::infrastructure::index::PathIndex;
use crate::features::path_tracer::domain::TracedPath;
use crate::features::termination_graph::domain::Cable;
use crate::shared::models::{PathId, PathNode, TerminationId};

pub struct IndexTransaction<'a> {
    base: &'a PathIndex,
    upserts: FxHashMap<PathId, CablePath>,
    removals: FxHashSet<PathId>,
    next_id: u64,
}

/// Overlay contents ready to be committed
#[derive(Debug, Clone)]
pub struct StagedChanges {
    upserts: Vec<CablePath>,
    removals: Vec<PathId>,
    next_id: PathId,
    changes: PathChangeSet,
}

impl StagedChanges {
    pub fn changes(&self) -> &PathChangeSet {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.removals.is_empty()
    }
}

impl<'a> IndexTransaction<'a> {
    pub fn new(base: &'a PathIndex) -> Self {
        Self {
            base,
            upserts: FxHashMap::default(),
            removals: FxHashSet::default(),
            next_id: base.next_id().0,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Merged reads
    // ═══════════════════════════════════════════════════════════════════════

    pub fn get(&self, id: PathId) -> Option<&CablePath> {
        if self.removals.contains(&id) {
            return None;
        }
        self.upserts.get(&id).or_else(|| self.base.get(id))
    }

    /// Paths containing `node` as the transaction currently sees them
    pub fn find_containing(&self, node: PathNode) -> Vec<PathId> {
        self.merged(self.base.find_containing(node), |p| p.contains(node))
    }

    pub fn find_containing_cable(&self, cable: &Cable) -> Vec<PathId> {
        let terminations: Vec<PathNode> =
            cable.all_terminations().map(PathNode::Termination).collect();
        let cable_node = PathNode::Cable(cable.id);
        self.merged(self.base.find_containing_cable(cable), |p| {
            p.contains(cable_node) || terminations.iter().any(|n| p.contains(*n))
        })
    }

    /// Paths whose origins intersect `terminations`
    pub fn find_by_origins(&self, terminations: &[TerminationId]) -> Vec<PathId> {
        let mut base_ids: Vec<PathId> = terminations
            .iter()
            .flat_map(|t| self.base.find_by_origin(*t))
            .collect();
        base_ids.sort_unstable();
        base_ids.dedup();
        self.merged(base_ids, |p| terminations.iter().any(|t| p.originates_at(*t)))
    }

    /// Paths whose final hop contains `node`
    pub fn find_ending_at(&self, node: PathNode) -> Vec<PathId> {
        self.find_containing(node)
            .into_iter()
            .filter(|id| self.get(*id).map(|p| p.ends_at(node)).unwrap_or(false))
            .collect()
    }

    /// Combine base hits with the overlay: drop removed or rewritten paths
    /// that no longer match, add upserted paths that now match
    fn merged(&self, base_ids: Vec<PathId>, predicate: impl Fn(&CablePath) -> bool) -> Vec<PathId> {
        let mut ids: Vec<PathId> = base_ids
            .into_iter()
            .filter(|id| !self.removals.contains(id))
            .filter(|id| self.upserts.get(id).map(&predicate).unwrap_or(true))
            .collect();
        ids.extend(
            self.upserts
                .values()
                .filter(|p| predicate(*p))
                .map(|p| p.id),
        );
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Staged writes
    // ═══════════════════════════════════════════════════════════════════════

    pub fn insert(&mut self, trace: TracedPath) -> PathId {
        let id = PathId(self.next_id);
        self.next_id += 1;
        self.upserts.insert(id, CablePath::new(id, trace));
        id
    }

    /// Replace the traced state of `id`, keeping its identity
    pub fn replace(&mut self, id: PathId, trace: TracedPath) {
        self.removals.remove(&id);
        self.upserts.insert(id, CablePath::new(id, trace));
    }

    /// Mark `id` inactive without touching its hops; false if already
    /// inactive or missing
    pub fn deactivate(&mut self, id: PathId) -> bool {
        let Some(path) = self.get(id) else {
            return false;
        };
        if !path.is_active() {
            return false;
        }
        let mut path = path.clone();
        path.trace.is_active = false;
        self.upserts.insert(id, path);
        true
    }

    pub fn remove(&mut self, id: PathId) {
        self.upserts.remove(&id);
        if self.base.get(id).is_some() {
            self.removals.insert(id);
        }
    }

    /// Freeze the overlay and compute its minimal change set
    pub fn into_staged(self) -> StagedChanges {
        let mut changes = PathChangeSet::default();
        let mut upserts = Vec::with_capacity(self.upserts.len());

        for (id, path) in self.upserts {
            match self.base.get(id) {
                None => changes.created.push(id),
                Some(old) if old.trace == path.trace => continue,
                Some(old) if old.trace.hops == path.trace.hops
                    && old.is_active()
                    && !path.is_active() =>
                {
                    changes.deactivated.push(id)
                }
                Some(_) => changes.updated.push(id),
            }
            upserts.push(path);
        }

        let mut removals: Vec<PathId> = self.removals.into_iter().collect();
        removals.sort_unstable();
        changes.deleted = removals.clone();

        changes.created.sort_unstable();
        changes.updated.sort_unstable();
        changes.deactivated.sort_unstable();
        upserts.sort_unstable_by_key(|p| p.id);

        StagedChanges {
            upserts,
            removals,
            next_id: PathId(self.next_id),
            changes,
        }
    }
}

impl PathIndex {
    /// Apply staged changes and return their change set
    pub fn commit(&mut self, staged: StagedChanges) -> PathChangeSet {
        for id in &staged.removals {
            self.remove(*id);
        }
        for path in staged.upserts {
            self.put(path);
        }
        self.reserve_ids(staged.next_id);
        staged.changes
    }
}
