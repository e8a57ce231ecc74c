//! Path index domain models

use serde::{Deserialize, Serialize};

use crate::features::path_tracer::domain::TracedPath;
use crate::shared::models::{PathId, PathNode, TerminationId};

/// Stored path: a traced path plus its stable identity
///
/// The id survives retraces; only the traced state is replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CablePath {
    pub id: PathId,
    #[serde(flatten)]
    pub trace: TracedPath,
}

impl CablePath {
    pub fn new(id: PathId, trace: TracedPath) -> Self {
        Self { id, trace }
    }

    pub fn origins(&self) -> &[TerminationId] {
        &self.trace.origins
    }

    pub fn destinations(&self) -> &[TerminationId] {
        &self.trace.destinations
    }

    pub fn is_active(&self) -> bool {
        self.trace.is_active
    }

    pub fn is_complete(&self) -> bool {
        self.trace.is_complete
    }

    pub fn is_split(&self) -> bool {
        self.trace.is_split
    }

    pub fn nodes(&self) -> impl Iterator<Item = PathNode> + '_ {
        self.trace.nodes()
    }

    pub fn contains(&self, node: PathNode) -> bool {
        self.trace.contains(node)
    }

    pub fn ends_at(&self, node: PathNode) -> bool {
        self.trace.ends_at(node)
    }

    pub fn originates_at(&self, termination: TerminationId) -> bool {
        self.trace.origins.contains(&termination)
    }
}

/// Path ids touched by one committed event
///
/// Lists are sorted and disjoint. A path created and deleted within the
/// same event appears nowhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathChangeSet {
    pub created: Vec<PathId>,
    pub updated: Vec<PathId>,
    /// Marked inactive with the hop sequence untouched
    pub deactivated: Vec<PathId>,
    pub deleted: Vec<PathId>,
}

impl PathChangeSet {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.updated.is_empty()
            && self.deactivated.is_empty()
            && self.deleted.is_empty()
    }

    pub fn len(&self) -> usize {
        self.created.len() + self.updated.len() + self.deactivated.len() + self.deleted.len()
    }

    /// Ids whose stored state must be (re)written
    pub fn upserted(&self) -> impl Iterator<Item = PathId> + '_ {
        self.created
            .iter()
            .chain(self.updated.iter())
            .chain(self.deactivated.iter())
            .copied()
    }

    /// Fold a later change set into this one
    ///
    /// Used when several events are handled back to back; a path created
    /// earlier and deleted later cancels out.
    pub fn merge(&mut self, later: PathChangeSet) {
        for id in later.deleted {
            if let Some(pos) = self.created.iter().position(|c| *c == id) {
                self.created.remove(pos);
                continue;
            }
            self.updated.retain(|u| *u != id);
            self.deactivated.retain(|d| *d != id);
            self.deleted.push(id);
        }
        for id in later.created {
            self.created.push(id);
        }
        for id in later.updated {
            if self.created.contains(&id) || self.updated.contains(&id) {
                continue;
            }
            self.deactivated.retain(|d| *d != id);
            self.updated.push(id);
        }
        for id in later.deactivated {
            if self.created.contains(&id)
                || self.updated.contains(&id)
                || self.deactivated.contains(&id)
            {
                continue;
            }
            self.deactivated.push(id);
        }
        self.created.sort_unstable();
        self.updated.sort_unstable();
        self.deactivated.sort_unstable();
        self.deleted.sort_unstable();
    }
}

/// Index statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub paths: usize,
    pub active: usize,
    pub complete: usize,
    pub split: usize,
    /// Distinct nodes in the reverse index
    pub indexed_nodes: usize,
    /// Total (node, path) reverse entries
    pub reverse_entries: usize,
}
