//! Cablepath Storage - persistence for the cable path index
//!
//! ## Core Principles
//!
//! 1. **Committed state only**: a batch is written after the engine commits an event
//! 2. **Stable identity**: rows are keyed by `PathId`, which survives retraces
//! 3. **Atomic batches**: one `PathChangeSet` maps to one SQL transaction
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cablepath_storage::{PathBatch, PathStore, SqlitePathStore};
//!
//! let store = SqlitePathStore::open("paths.db")?;
//!
//! // Warm start
//! let controller = ConsistencyController::with_index(config, store.load_index().await?);
//!
//! // Per event
//! let changes = controller.handle(&topology, &event)?;
//! let batch = PathBatch::from_changes(&changes, &controller.index());
//! store.apply(&batch).await?;
//! ```

pub mod domain;
pub mod error;

#[cfg(feature = "sqlite")]
pub mod infrastructure;

pub use error::{ErrorKind, Result, StorageError};

pub use domain::{PathBatch, PathRecord, PathStore};

#[cfg(feature = "sqlite")]
pub use infrastructure::SqlitePathStore;
