//! Durable storage for closure records
//!
//! The store itself is in-memory; durability is an adapter concern. Saves
//! are best-effort snapshots and never part of the in-memory consistency
//! contract.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection};
use thiserror::Error;
use tracing::warn;

use crate::model::ClosureRecord;

/// Durable load/save of closure history across restarts.
///
/// `load` runs once at startup; `save` runs after store mutations and may
/// be batched or debounced by implementations.
pub trait PersistenceAdapter: Send {
    fn load(&self) -> anyhow::Result<Vec<ClosureRecord>>;
    fn save(&self, records: &[ClosureRecord]) -> anyhow::Result<()>;
}

#[derive(Error, Debug)]
pub enum SqliteStoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Failed to determine data directory")]
    NoDataDir,
    #[error("Failed to create data directory: {0}")]
    CreateDir(std::io::Error),
}

/// SQLite-backed [`PersistenceAdapter`].
///
/// One row per record: id and closure timestamp as queryable columns, the
/// full record as a JSON payload. Rows that fail to decode or violate the
/// record invariants are dropped at load with a warning; the rest of
/// history is retained.
#[derive(Clone)]
pub struct SqliteClosureStore {
    conn: Arc<Mutex<Connection>>,
    /// Path to the database file
    pub path: PathBuf,
}

impl SqliteClosureStore {
    /// Open or create a database at the specified path
    pub fn open(path: PathBuf) -> Result<Self, SqliteStoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SqliteStoreError::CreateDir)?;
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS closure_records (
                position INTEGER PRIMARY KEY,
                record_id INTEGER NOT NULL,
                closed_at TEXT NOT NULL,
                payload TEXT NOT NULL
            );",
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    /// Open the database in the default location
    /// (`<data dir>/tabvault/closures.db`).
    pub fn open_default() -> Result<Self, SqliteStoreError> {
        let dir = dirs::data_dir().ok_or(SqliteStoreError::NoDataDir)?;
        Self::open(dir.join("tabvault").join("closures.db"))
    }

    fn row_to_record(payload: &str) -> Option<ClosureRecord> {
        let record: ClosureRecord = match serde_json::from_str(payload) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "dropping undecodable closure record");
                return None;
            }
        };
        if let Err(violation) = record.kind.validate() {
            warn!(record_id = %record.id, %violation, "dropping malformed closure record");
            return None;
        }
        Some(record)
    }
}

impl PersistenceAdapter for SqliteClosureStore {
    fn load(&self) -> anyhow::Result<Vec<ClosureRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT payload FROM closure_records ORDER BY position")?;
        let payloads = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .filter_map(|r| r.ok())
            .collect::<Vec<_>>();

        Ok(payloads
            .iter()
            .filter_map(|p| Self::row_to_record(p))
            .collect())
    }

    fn save(&self, records: &[ClosureRecord]) -> anyhow::Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM closure_records", [])?;
        for (position, record) in records.iter().enumerate() {
            let payload = serde_json::to_string(record)?;
            tx.execute(
                "INSERT INTO closure_records (position, record_id, closed_at, payload)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    position as i64,
                    record.id.0 as i64,
                    record.closed_at.to_rfc3339(),
                    payload,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
