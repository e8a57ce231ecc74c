//! SQLite adapter for PathStore
//!
//! Tables:
//! - `cable_paths`: one row per path; origins, destinations and hops as JSON
//! - `path_nodes`: reverse index rows `(path_id, node_kind, node_id)`
//!
//! Every batch runs in a single SQL transaction, including the wipe of a
//! `replace_all` batch.

use std::path::Path;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use cablepath_engine::{CablePath, PathId, PathNode, TracedPath};

use crate::domain::{PathBatch, PathRecord, PathStore};
use crate::error::{Result, StorageError};

const NODE_TERMINATION: &str = "termination";
const NODE_CABLE: &str = "cable";

/// SQLite-backed path store
pub struct SqlitePathStore {
    conn: Mutex<Connection>,
}

impl SqlitePathStore {
    /// Open (or create) a database file
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        info!("SqlitePathStore::open: {}", db_path.display());
        Ok(store)
    }

    /// In-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS cable_paths (
                path_id INTEGER PRIMARY KEY,
                origins TEXT NOT NULL,
                destinations TEXT NOT NULL,
                hops TEXT NOT NULL,
                is_active BOOLEAN NOT NULL,
                is_complete BOOLEAN NOT NULL,
                is_split BOOLEAN NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS path_nodes (
                path_id INTEGER NOT NULL,
                node_kind TEXT NOT NULL,
                node_id INTEGER NOT NULL,
                PRIMARY KEY (path_id, node_kind, node_id),
                FOREIGN KEY (path_id) REFERENCES cable_paths(path_id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_path_nodes_node
             ON path_nodes(node_kind, node_id)",
            [],
        )?;

        Ok(())
    }
}

/// Raw `cable_paths` row before JSON decoding
struct PathRow {
    id: i64,
    origins: String,
    destinations: String,
    hops: String,
    is_active: bool,
    is_complete: bool,
    is_split: bool,
    updated_at: i64,
}

const SELECT_PATH: &str = "SELECT path_id, origins, destinations, hops, is_active, is_complete,
            is_split, updated_at
     FROM cable_paths";

impl PathRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            origins: row.get(1)?,
            destinations: row.get(2)?,
            hops: row.get(3)?,
            is_active: row.get(4)?,
            is_complete: row.get(5)?,
            is_split: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn into_record(self) -> Result<PathRecord> {
        let trace = TracedPath {
            origins: serde_json::from_str(&self.origins)?,
            hops: serde_json::from_str(&self.hops)?,
            destinations: serde_json::from_str(&self.destinations)?,
            is_active: self.is_active,
            is_complete: self.is_complete,
            is_split: self.is_split,
        };
        Ok(PathRecord {
            path: CablePath::new(PathId(from_sql_id(self.id)?), trace),
            updated_at: chrono::DateTime::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        })
    }
}

fn to_sql_id(id: u64) -> Result<i64> {
    i64::try_from(id).map_err(|_| StorageError::database(format!("id {id} exceeds INTEGER range")))
}

fn from_sql_id(id: i64) -> Result<u64> {
    u64::try_from(id).map_err(|_| StorageError::database(format!("negative id {id} in database")))
}

fn node_key(node: PathNode) -> Result<(&'static str, i64)> {
    match node {
        PathNode::Termination(id) => Ok((NODE_TERMINATION, to_sql_id(id.0)?)),
        PathNode::Cable(id) => Ok((NODE_CABLE, to_sql_id(id.0)?)),
    }
}

#[async_trait]
impl PathStore for SqlitePathStore {
    async fn apply(&self, batch: &PathBatch) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let conn = self.conn.lock();
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StorageError::transaction("begin batch").with_source(e))?;
        let now = chrono::Utc::now().timestamp();

        if batch.replace_all {
            tx.execute("DELETE FROM path_nodes", [])?;
            tx.execute("DELETE FROM cable_paths", [])?;
        }

        for id in &batch.deletes {
            let id = to_sql_id(id.0)?;
            tx.execute("DELETE FROM path_nodes WHERE path_id = ?1", params![id])?;
            tx.execute("DELETE FROM cable_paths WHERE path_id = ?1", params![id])?;
        }

        for path in &batch.upserts {
            let id = to_sql_id(path.id.0)?;
            tx.execute(
                "INSERT OR REPLACE INTO cable_paths
                    (path_id, origins, destinations, hops, is_active, is_complete, is_split, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id,
                    serde_json::to_string(path.origins())?,
                    serde_json::to_string(path.destinations())?,
                    serde_json::to_string(&path.trace.hops)?,
                    path.is_active(),
                    path.is_complete(),
                    path.is_split(),
                    now
                ],
            )?;

            tx.execute("DELETE FROM path_nodes WHERE path_id = ?1", params![id])?;
            for node in path.nodes() {
                let (kind, node_id) = node_key(node)?;
                tx.execute(
                    "INSERT OR IGNORE INTO path_nodes (path_id, node_kind, node_id)
                     VALUES (?1, ?2, ?3)",
                    params![id, kind, node_id],
                )?;
            }
        }

        tx.commit()
            .map_err(|e| StorageError::transaction("commit batch").with_source(e))?;

        debug!(
            "SqlitePathStore::apply: {} upserts, {} deletes, replace_all={}",
            batch.upserts.len(),
            batch.deletes.len(),
            batch.replace_all
        );
        Ok(batch.len())
    }

    async fn load_all(&self) -> Result<Vec<CablePath>> {
        let rows = {
            let conn = self.conn.lock();
            let mut stmt = conn.prepare(&format!("{SELECT_PATH} ORDER BY path_id"))?;
            let rows = stmt.query_map([], PathRow::from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        rows.into_iter()
            .map(|row| row.into_record().map(|record| record.path))
            .collect()
    }

    async fn get(&self, id: PathId) -> Result<PathRecord> {
        let row = {
            let conn = self.conn.lock();
            conn.query_row(
                &format!("{SELECT_PATH} WHERE path_id = ?1"),
                params![to_sql_id(id.0)?],
                PathRow::from_row,
            )
            .optional()?
        };

        match row {
            Some(row) => row.into_record(),
            None => Err(StorageError::path_not_found(id)),
        }
    }

    async fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM cable_paths", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    async fn find_containing(&self, node: PathNode) -> Result<Vec<PathId>> {
        let (kind, node_id) = node_key(node)?;
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT path_id FROM path_nodes
             WHERE node_kind = ?1 AND node_id = ?2
             ORDER BY path_id",
        )?;
        let ids = stmt
            .query_map(params![kind, node_id], |row| row.get::<_, i64>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        ids.into_iter().map(|id| from_sql_id(id).map(PathId)).collect()
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.conn.lock();
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM path_nodes", [])?;
        tx.execute("DELETE FROM cable_paths", [])?;
        tx.commit()?;
        Ok(())
    }
}
