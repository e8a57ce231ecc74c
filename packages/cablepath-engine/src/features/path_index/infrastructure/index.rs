//! In-memory path index
//!
//! Primary storage keyed by `PathId` plus a reverse map from every node to
//! the paths containing it. Every stored path is reachable from each of its
//! nodes; removing or replacing a path purges its old reverse entries.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::features::path_index::domain::{CablePath, IndexStats};
use crate::features::path_tracer::domain::TracedPath;
use crate::features::termination_graph::domain::Cable;
use crate::shared::models::{PathId, PathNode, TerminationId};

#[derive(Debug, Clone)]
pub struct PathIndex {
    paths: FxHashMap<PathId, CablePath>,
    by_node: FxHashMap<PathNode, FxHashSet<PathId>>,
    next_id: u64,
}

impl Default for PathIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl PathIndex {
    pub fn new() -> Self {
        Self {
            paths: FxHashMap::default(),
            by_node: FxHashMap::default(),
            next_id: 1,
        }
    }

    /// Rebuild an index from persisted paths, keeping their ids
    pub fn from_paths(paths: impl IntoIterator<Item = CablePath>) -> Self {
        let mut index = Self::new();
        for path in paths {
            index.put(path);
        }
        index
    }

    /// Id the next inserted path will receive
    pub fn next_id(&self) -> PathId {
        PathId(self.next_id)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn get(&self, id: PathId) -> Option<&CablePath> {
        self.paths.get(&id)
    }

    /// Unordered iteration over stored paths
    pub fn iter(&self) -> impl Iterator<Item = &CablePath> {
        self.paths.values()
    }

    /// All paths ordered by id
    pub fn paths(&self) -> Vec<&CablePath> {
        let mut paths: Vec<&CablePath> = self.paths.values().collect();
        paths.sort_unstable_by_key(|p| p.id);
        paths
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Mutation
    // ═══════════════════════════════════════════════════════════════════════

    /// Insert a freshly traced path under a newly allocated id
    pub fn insert(&mut self, trace: TracedPath) -> PathId {
        let id = PathId(self.next_id);
        self.put(CablePath::new(id, trace));
        id
    }

    /// Replace the traced state of `id` in place, returning the old state
    ///
    /// Inserts under `id` when it is not stored yet.
    pub fn replace(&mut self, id: PathId, trace: TracedPath) -> Option<TracedPath> {
        self.put(CablePath::new(id, trace)).map(|old| old.trace)
    }

    pub fn remove(&mut self, id: PathId) -> Option<CablePath> {
        let path = self.paths.remove(&id)?;
        self.unindex(&path);
        Some(path)
    }

    pub fn clear(&mut self) {
        self.paths.clear();
        self.by_node.clear();
    }

    /// Store `path` under its own id, replacing any previous version
    pub(crate) fn put(&mut self, path: CablePath) -> Option<CablePath> {
        let id = path.id;
        self.next_id = self.next_id.max(id.0 + 1);
        let previous = self.paths.remove(&id);
        if let Some(old) = &previous {
            self.unindex(old);
        }
        for node in path.nodes() {
            self.by_node.entry(node).or_default().insert(id);
        }
        self.paths.insert(id, path);
        previous
    }

    pub(crate) fn reserve_ids(&mut self, next_id: PathId) {
        self.next_id = self.next_id.max(next_id.0);
    }

    fn unindex(&mut self, path: &CablePath) {
        for node in path.nodes() {
            if let Some(ids) = self.by_node.get_mut(&node) {
                ids.remove(&path.id);
                if ids.is_empty() {
                    self.by_node.remove(&node);
                }
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    /// Paths containing `node`, ordered by id
    pub fn find_containing(&self, node: PathNode) -> Vec<PathId> {
        let mut ids: Vec<PathId> = self
            .by_node
            .get(&node)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Paths touching `cable`: the cable node itself or any termination on
    /// either of its sides
    pub fn find_containing_cable(&self, cable: &Cable) -> Vec<PathId> {
        let mut ids: FxHashSet<PathId> = FxHashSet::default();
        ids.extend(self.find_containing(PathNode::Cable(cable.id)));
        for termination in cable.all_terminations() {
            ids.extend(self.find_containing(PathNode::Termination(termination)));
        }
        let mut ids: Vec<PathId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids
    }

    /// Paths originating at `termination`
    pub fn find_by_origin(&self, termination: TerminationId) -> Vec<PathId> {
        self.find_containing(PathNode::Termination(termination))
            .into_iter()
            .filter(|id| {
                self.paths
                    .get(id)
                    .map(|p| p.originates_at(termination))
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            paths: self.paths.len(),
            active: self.paths.values().filter(|p| p.is_active()).count(),
            complete: self.paths.values().filter(|p| p.is_complete()).count(),
            split: self.paths.values().filter(|p| p.is_split()).count(),
            indexed_nodes: self.by_node.len(),
            reverse_entries: self.by_node.values().map(|ids| ids.len()).sum(),
        }
    }

    /// Verify the reverse index against primary storage
    ///
    /// Every node of every path must map back to it, and every reverse
    /// entry must point at a stored path that contains the node.
    pub fn check_consistency(&self) -> Result<(), String> {
        let mut problems = Vec::new();

        for path in self.paths.values() {
            for node in path.nodes() {
                let indexed = self
                    .by_node
                    .get(&node)
                    .map(|ids| ids.contains(&path.id))
                    .unwrap_or(false);
                if !indexed {
                    problems.push(format!("{} missing from reverse entry of {}", path.id, node));
                }
            }
            if path.id.0 >= self.next_id {
                problems.push(format!("{} not below next id {}", path.id, self.next_id));
            }
        }

        for (node, ids) in &self.by_node {
            if ids.is_empty() {
                problems.push(format!("empty reverse entry for {node}"));
            }
            for id in ids {
                match self.paths.get(id) {
                    Some(path) if path.contains(*node) => {}
                    Some(_) => problems.push(format!("{node} maps to {id} which does not contain it")),
                    None => problems.push(format!("{node} maps to missing {id}")),
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            problems.sort();
            Err(problems.join("; "))
        }
    }
}
