//! Append-only audit trail of reconciliation outcomes.

use chrono::{DateTime, Duration, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::model::{OutcomeDirection, ReconciliationOutcome};

use super::database::Database;

/// Aggregate counters over a time window of audit rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditStats {
    pub total: i64,
    pub successful: i64,
    pub distinct_vehicles: i64,
    pub last_outcome_time: Option<DateTime<Utc>>,
}

/// A vehicle with failed outcomes inside the queried window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailingVehicle {
    pub vehicle_name: String,
    pub failure_count: i64,
    pub last_error: Option<String>,
    pub last_attempt: DateTime<Utc>,
}

/// Durable, append-only record of every reconciliation outcome.
///
/// Pure sink: no business logic lives here.
pub struct AuditLog<'a> {
    db: &'a Database,
}

impl<'a> AuditLog<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Append one outcome, success or failure.
    pub fn append(&self, outcome: &ReconciliationOutcome) -> Result<(), PersistenceError> {
        self.db.conn().execute(
            "INSERT INTO sync_log (
                vehicle_name, dispatch_id, asset_id,
                sync_direction, fields_synced, success,
                error_message, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                outcome.vehicle_name,
                outcome.dispatch_id,
                outcome.asset_id,
                outcome.sync_direction.map(OutcomeDirection::as_str),
                serde_json::to_string(&outcome.fields_synced)?,
                outcome.success,
                outcome.error_message,
                outcome.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Most recent outcomes, newest first.
    pub fn recent(&self, limit: u32) -> Result<Vec<ReconciliationOutcome>, PersistenceError> {
        self.query_outcomes(
            "SELECT vehicle_name, dispatch_id, asset_id, sync_direction,
                    fields_synced, success, error_message, created_at
             FROM sync_log
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
            params![limit],
        )
    }

    /// Aggregate counters over the last `window_hours` hours.
    pub fn stats(&self, window_hours: i64) -> Result<AuditStats, PersistenceError> {
        let cutoff = (Utc::now() - Duration::hours(window_hours)).to_rfc3339();
        let (total, successful, distinct_vehicles, last_raw) = self.db.conn().query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(success), 0),
                    COUNT(DISTINCT vehicle_name),
                    MAX(created_at)
             FROM sync_log
             WHERE created_at >= ?1",
            params![cutoff],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            },
        )?;
        Ok(AuditStats {
            total,
            successful,
            distinct_vehicles,
            last_outcome_time: last_raw.as_deref().map(parse_stored_ts).transpose()?,
        })
    }

    /// Outcomes for one vehicle over the last `days` days, newest first.
    pub fn vehicle_history(
        &self,
        vehicle_name: &str,
        days: i64,
    ) -> Result<Vec<ReconciliationOutcome>, PersistenceError> {
        let cutoff = (Utc::now() - Duration::days(days)).to_rfc3339();
        self.query_outcomes(
            "SELECT vehicle_name, dispatch_id, asset_id, sync_direction,
                    fields_synced, success, error_message, created_at
             FROM sync_log
             WHERE vehicle_name = ?1 AND created_at >= ?2
             ORDER BY created_at DESC, id DESC",
            params![vehicle_name, cutoff],
        )
    }

    /// Vehicles with failed outcomes in the last `window_hours` hours,
    /// worst offenders first.
    pub fn failing_vehicles(
        &self,
        window_hours: i64,
    ) -> Result<Vec<FailingVehicle>, PersistenceError> {
        let cutoff = (Utc::now() - Duration::hours(window_hours)).to_rfc3339();
        let mut stmt = self.db.conn().prepare(
            "SELECT vehicle_name, COUNT(*), MAX(error_message), MAX(created_at)
             FROM sync_log
             WHERE success = 0 AND created_at >= ?1
             GROUP BY vehicle_name
             ORDER BY COUNT(*) DESC",
        )?;
        let rows = stmt.query_map(params![cutoff], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut failing = Vec::new();
        for row in rows {
            let (vehicle_name, failure_count, last_error, last_raw) = row?;
            failing.push(FailingVehicle {
                vehicle_name,
                failure_count,
                last_error,
                last_attempt: parse_stored_ts(&last_raw)?,
            });
        }
        Ok(failing)
    }

    /// Delete outcomes older than `days` days; returns the deleted count.
    pub fn purge_older_than(&self, days: i64) -> Result<usize, PersistenceError> {
        let cutoff = (Utc::now() - Duration::days(days)).to_rfc3339();
        let deleted = self.db.conn().execute(
            "DELETE FROM sync_log WHERE created_at < ?1",
            params![cutoff],
        )?;
        Ok(deleted)
    }

    fn query_outcomes(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<ReconciliationOutcome>, PersistenceError> {
        let mut stmt = self.db.conn().prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, bool>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, String>(7)?,
            ))
        })?;

        let mut outcomes = Vec::new();
        for row in rows {
            let (vehicle_name, dispatch_id, asset_id, direction_raw, fields_raw, success, error_message, created_raw) =
                row?;
            outcomes.push(ReconciliationOutcome {
                vehicle_name,
                dispatch_id,
                asset_id,
                sync_direction: direction_raw.as_deref().and_then(OutcomeDirection::parse),
                fields_synced: serde_json::from_str(&fields_raw)?,
                success,
                error_message,
                created_at: parse_stored_ts(&created_raw)?,
            });
        }
        Ok(outcomes)
    }
}

fn parse_stored_ts(raw: &str) -> Result<DateTime<Utc>, PersistenceError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| PersistenceError::Timestamp(raw.to_string()))
}
