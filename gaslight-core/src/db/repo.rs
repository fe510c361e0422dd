//! Queue repository layer
//!
//! Provides the append, enumerate and remove operations over the `queue` table.

use crate::error::{Error, Result};
use crate::types::{Entry, EntryId};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Handle to the durable request queue
///
/// Constructed once at startup and shared by reference between the capture
/// path and the replay path. Every append and delete is a single autocommit
/// statement, so it is either fully committed or not observed at all.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a queue database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // FULL sync: an append must be on stable storage before its id is returned
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = FULL;
            ",
        )?;

        tracing::debug!(path = %path.display(), "Opened queue database");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock();
        super::schema::run_migrations(&conn)
    }

    /// Schema version recorded by the last migration
    pub fn schema_version(&self) -> Result<i32> {
        let conn = self.lock();
        super::schema::get_schema_version(&conn)
    }

    /// Close the underlying connection, surfacing any error from SQLite
    pub fn close(self) -> Result<()> {
        let conn = self
            .conn
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        conn.close().map_err(|(_, e)| Error::Storage(e))
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // Statements are atomic, so a panicking holder cannot leave a half-written row
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ============================================
    // Queue operations
    // ============================================

    /// Append an entry to the tail of the queue
    ///
    /// Returns only after the row is committed.
    pub fn append(&self, destination: &str, payload: &[u8]) -> Result<EntryId> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO queue (destination, payload) VALUES (?1, ?2)",
            params![destination, payload],
        )?;
        let id = EntryId(conn.last_insert_rowid());

        tracing::debug!(
            id = %id,
            destination,
            bytes = payload.len(),
            "Appended entry"
        );

        Ok(id)
    }

    /// Snapshot of every queued entry, ordered by id ascending
    pub fn entries(&self) -> Result<Vec<Entry>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT id, destination, payload FROM queue ORDER BY id ASC")?;
        let entries = stmt
            .query_map([], Self::row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    fn row_to_entry(row: &Row) -> rusqlite::Result<Entry> {
        Ok(Entry {
            id: EntryId(row.get("id")?),
            destination: row.get("destination")?,
            payload: row.get("payload")?,
        })
    }

    /// Delete an entry by id
    ///
    /// Removing an id that is not queued is a no-op and returns `false`.
    pub fn remove(&self, id: EntryId) -> Result<bool> {
        let conn = self.lock();
        let deleted = conn.execute("DELETE FROM queue WHERE id = ?1", params![id.0])?;

        if deleted == 0 {
            tracing::debug!(id = %id, "Remove of absent entry ignored");
        }

        Ok(deleted > 0)
    }

    /// Number of entries currently queued
    pub fn count(&self) -> Result<usize> {
        let conn = self.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM queue", [], |r| r.get(0))?;
        Ok(count as usize)
    }
}
