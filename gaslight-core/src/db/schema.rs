//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: request queue
    r#"
    -- AUTOINCREMENT keeps ids monotonic even after the newest row is deleted.
    CREATE TABLE IF NOT EXISTS queue (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        destination      TEXT NOT NULL,
        payload          BLOB NOT NULL
    );

    -- Queues written by earlier releases keep rows in `requests`, keyed by
    -- rowid. Carry them over in capture order, then retire the table.
    CREATE TABLE IF NOT EXISTS requests (destination TEXT, request BLOB);

    INSERT INTO queue (destination, payload)
        SELECT COALESCE(destination, ''), CAST(COALESCE(request, X'') AS BLOB)
        FROM requests
        ORDER BY rowid ASC;

    DROP TABLE requests;
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            let tx = conn.unchecked_transaction()?;
            tx.execute_batch(migration)?;
            tx.execute(&format!("PRAGMA user_version = {}", version), [])?;
            tx.commit()?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}
