//! Domain layer for path persistence
//!
//! # Domain Models
//!
//! - `PathRecord`: a stored path plus its last write time
//! - `PathBatch`: the writes implied by one committed `PathChangeSet`, or a
//!   full replacement of the stored paths
//!
//! # Port Trait
//!
//! - `PathStore`: persistence for the path index
//!
//! # Examples
//!
//! ```rust,ignore
//! use cablepath_storage::{PathBatch, PathStore};
//!
//! async fn persist(store: &impl PathStore, controller: &ConsistencyController,
//!                  changes: &PathChangeSet) -> Result<()> {
//!     // Collect under the read lock, write without it
//!     let batch = PathBatch::from_changes(changes, &controller.index());
//!     store.apply(&batch).await?;
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cablepath_engine::{CablePath, PathChangeSet, PathId, PathIndex, PathNode};

use crate::Result;

// ═══════════════════════════════════════════════════════════════════════════
// Domain Models
// ═══════════════════════════════════════════════════════════════════════════

/// Stored path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRecord {
    pub path: CablePath,
    pub updated_at: DateTime<Utc>,
}

impl PathRecord {
    pub fn new(path: CablePath) -> Self {
        Self {
            path,
            updated_at: Utc::now(),
        }
    }

    pub fn id(&self) -> PathId {
        self.path.id
    }
}

/// Rows to upsert and delete for one committed change set
///
/// Built from the index right after the commit, while the caller still
/// holds (or can cheaply take) the read lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathBatch {
    pub upserts: Vec<CablePath>,
    pub deletes: Vec<PathId>,
    /// Drop every stored path before writing `upserts`
    pub replace_all: bool,
}

impl PathBatch {
    pub fn from_changes(changes: &PathChangeSet, index: &PathIndex) -> Self {
        Self {
            upserts: changes
                .upserted()
                .filter_map(|id| index.get(id).cloned())
                .collect(),
            deletes: changes.deleted.clone(),
            replace_all: false,
        }
    }

    /// Replace the stored paths with exactly those in `index`
    ///
    /// Used to resync after `rebuild_all`; stored paths missing from the
    /// index are removed in the same transaction.
    pub fn full(index: &PathIndex) -> Self {
        Self {
            upserts: index.paths().into_iter().cloned().collect(),
            deletes: Vec::new(),
            replace_all: true,
        }
    }

    /// Whether applying this batch would leave the store unchanged
    pub fn is_empty(&self) -> bool {
        !self.replace_all && self.upserts.is_empty() && self.deletes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.upserts.len() + self.deletes.len()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Port Trait
// ═══════════════════════════════════════════════════════════════════════════

/// Path persistence port
///
/// # Implementations
///
/// - `SqlitePathStore`: SQLite adapter
#[async_trait]
pub trait PathStore: Send + Sync {
    /// Apply one batch atomically
    ///
    /// Either every upsert and delete lands or none does.
    async fn apply(&self, batch: &PathBatch) -> Result<usize>;

    /// Every stored path, ordered by id
    async fn load_all(&self) -> Result<Vec<CablePath>>;

    /// Get one stored path
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::PathNotFound` if the id is not stored
    async fn get(&self, id: PathId) -> Result<PathRecord>;

    async fn count(&self) -> Result<usize>;

    /// Ids of stored paths containing `node`, ordered
    async fn find_containing(&self, node: PathNode) -> Result<Vec<PathId>>;

    /// Drop every stored path
    async fn clear(&self) -> Result<()>;

    /// Rehydrate an index from storage, keeping path ids
    async fn load_index(&self) -> Result<PathIndex> {
        Ok(PathIndex::from_paths(self.load_all().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cablepath_engine::{TerminationId, TracedPath};

    fn path(id: u64) -> TracedPath {
        TracedPath {
            origins: vec![TerminationId(id)],
            hops: vec![vec![PathNode::Termination(TerminationId(id))]],
            destinations: vec![],
            is_active: false,
            is_complete: false,
            is_split: false,
        }
    }

    #[test]
    fn test_batch_from_changes() {
        let mut index = PathIndex::new();
        let kept = index.insert(path(1));
        let changes = PathChangeSet {
            created: vec![kept],
            deleted: vec![PathId(9)],
            ..Default::default()
        };

        let batch = PathBatch::from_changes(&changes, &index);
        assert_eq!(batch.upserts.len(), 1);
        assert_eq!(batch.upserts[0].id, kept);
        assert_eq!(batch.deletes, vec![PathId(9)]);
        assert_eq!(batch.len(), 2);
        assert!(!batch.replace_all);
    }

    #[test]
    fn test_full_batch_of_empty_index_is_not_empty() {
        let batch = PathBatch::full(&PathIndex::new());
        assert!(batch.replace_all);
        assert!(batch.upserts.is_empty());
        assert!(!batch.is_empty());
    }

    #[test]
    fn test_record_serde() {
        let record = PathRecord::new(CablePath::new(PathId(3), path(1)));
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("updated_at"));

        let back: PathRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.id(), PathId(3));
    }
}
