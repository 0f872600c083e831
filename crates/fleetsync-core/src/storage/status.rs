//! Single-row system status bookkeeping.

use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::error::PersistenceError;
use crate::model::SystemStatusSnapshot;

use super::database::Database;

/// Update-only view over the `system_status` singleton row.
///
/// The row is created on the first pass and updated atomically once per
/// pass afterwards; it is never deleted during normal operation.
pub struct SystemStatusTracker<'a> {
    db: &'a Database,
}

impl<'a> SystemStatusTracker<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Current snapshot, or `None` before the first recorded pass or
    /// auto-sync change.
    pub fn snapshot(&self) -> Result<Option<SystemStatusSnapshot>, PersistenceError> {
        let result = self.db.conn().query_row(
            "SELECT last_sync, last_sync_count, total_syncs,
                    auto_sync_enabled, sync_interval, updated_at
             FROM system_status
             WHERE id = 1",
            [],
            |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, bool>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            },
        );
        let (last_raw, last_sync_count, total_syncs, auto_sync_enabled, sync_interval_secs, updated_raw) =
            match result {
                Ok(row) => row,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(e) => return Err(e.into()),
            };
        Ok(Some(SystemStatusSnapshot {
            last_sync: last_raw.as_deref().map(parse_ts).transpose()?,
            last_sync_count,
            total_syncs,
            auto_sync_enabled,
            sync_interval_secs,
            updated_at: updated_raw.as_deref().map(parse_ts).transpose()?,
        }))
    }

    /// Record one completed pass: the instant captured at pass start (not
    /// at the end, so pass duration never skews the reported sync time),
    /// the number of outcomes produced, and a lifetime counter bump.
    pub fn record_pass(
        &self,
        started_at: DateTime<Utc>,
        outcome_count: usize,
    ) -> Result<(), PersistenceError> {
        self.db.conn().execute(
            "INSERT INTO system_status
                (id, last_sync, last_sync_count, total_syncs, auto_sync_enabled, sync_interval, updated_at)
             VALUES (1, ?1, ?2, 1, 0, 300, ?3)
             ON CONFLICT(id) DO UPDATE SET
                last_sync = excluded.last_sync,
                last_sync_count = excluded.last_sync_count,
                total_syncs = total_syncs + 1,
                updated_at = excluded.updated_at",
            params![
                started_at.to_rfc3339(),
                outcome_count as i64,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Enable or disable automatic syncing and set the interval.
    pub fn set_auto_sync(&self, enabled: bool, interval_secs: i64) -> Result<(), PersistenceError> {
        self.db.conn().execute(
            "INSERT INTO system_status
                (id, last_sync, last_sync_count, total_syncs, auto_sync_enabled, sync_interval, updated_at)
             VALUES (1, NULL, 0, 0, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                auto_sync_enabled = excluded.auto_sync_enabled,
                sync_interval = excluded.sync_interval,
                updated_at = excluded.updated_at",
            params![enabled, interval_secs, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>, PersistenceError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| PersistenceError::Timestamp(raw.to_string()))
}
