//! SQLite database handle and schema.
//!
//! One `Database` owns the connection; the audit log, status tracker and
//! policy store are thin views over it. The handle is passed into the
//! engine at construction -- there is no process-wide singleton.

use std::path::Path;

use rusqlite::Connection;

use crate::error::PersistenceError;

use super::data_dir;

/// SQLite database for the audit trail, system status and sync policy.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/fleetsync/fleetsync.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self, PersistenceError> {
        let path = data_dir()
            .map_err(|e| PersistenceError::DataDir(e.to_string()))?
            .join("fleetsync.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path).map_err(|source| PersistenceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sync_log (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                vehicle_name   TEXT NOT NULL,
                dispatch_id    INTEGER NOT NULL,
                asset_id       INTEGER NOT NULL,
                sync_direction TEXT,
                fields_synced  TEXT NOT NULL DEFAULT '[]',
                success        INTEGER NOT NULL,
                error_message  TEXT,
                created_at     TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sync_fields (
                field_name TEXT PRIMARY KEY,
                enabled    INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS system_status (
                id                INTEGER PRIMARY KEY CHECK (id = 1),
                last_sync         TEXT,
                last_sync_count   INTEGER NOT NULL DEFAULT 0,
                total_syncs       INTEGER NOT NULL DEFAULT 0,
                auto_sync_enabled INTEGER NOT NULL DEFAULT 0,
                sync_interval     INTEGER NOT NULL DEFAULT 300,
                updated_at        TEXT
            );

            -- Indexes for the audit query patterns
            CREATE INDEX IF NOT EXISTS idx_sync_log_created_at ON sync_log(created_at);
            CREATE INDEX IF NOT EXISTS idx_sync_log_vehicle ON sync_log(vehicle_name, created_at);",
        )?;
        Ok(())
    }
}
