//! Per-field sync policy.
//!
//! Policy rows live in the `sync_fields` table. The fail-open default is
//! deliberate and explicit: a field with no configured row is enabled, so
//! the absence of configuration never blocks syncing.

use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::storage::Database;

/// Fallback field set when policy yields no enabled fields.
pub const DEFAULT_SYNC_FIELDS: [&str; 2] = ["status", "comment"];

/// One configured policy row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPolicy {
    pub field: String,
    pub enabled: bool,
}

/// Policy rows as loaded at engine construction. A long-lived engine that
/// wants fresh policy must reload explicitly (`ReconciliationEngine::reload_policy`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicySnapshot {
    rows: Vec<FieldPolicy>,
}

impl PolicySnapshot {
    pub fn from_rows(rows: Vec<FieldPolicy>) -> Self {
        Self { rows }
    }

    /// Whether a field is currently eligible for syncing. Unconfigured
    /// fields default to enabled.
    pub fn is_field_enabled(&self, field: &str) -> bool {
        self.rows
            .iter()
            .find(|row| row.field == field)
            .map_or(true, |row| row.enabled)
    }

    /// Names of all explicitly enabled fields, in configured order.
    pub fn enabled_fields(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter(|row| row.enabled)
            .map(|row| row.field.clone())
            .collect()
    }

    /// Field set reported for a push toward the dispatch system: the
    /// enabled set, or the default pair when nothing is configured.
    pub fn fields_for_dispatch_push(&self) -> Vec<String> {
        let fields = self.enabled_fields();
        if fields.is_empty() {
            DEFAULT_SYNC_FIELDS.iter().map(|s| s.to_string()).collect()
        } else {
            fields
        }
    }
}

/// SQLite-backed store for the per-field sync policy.
pub struct SyncPolicyStore<'a> {
    db: &'a Database,
}

impl<'a> SyncPolicyStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Load all configured rows into a snapshot.
    pub fn load(&self) -> Result<PolicySnapshot, PersistenceError> {
        Ok(PolicySnapshot::from_rows(self.rows()?))
    }

    /// All configured rows, enabled and disabled.
    pub fn rows(&self) -> Result<Vec<FieldPolicy>, PersistenceError> {
        let mut stmt = self
            .db
            .conn()
            .prepare("SELECT field_name, enabled FROM sync_fields ORDER BY field_name")?;
        let rows = stmt.query_map([], |row| {
            Ok(FieldPolicy {
                field: row.get(0)?,
                enabled: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Upsert one field's enabled flag.
    pub fn set_field(&self, field: &str, enabled: bool) -> Result<(), PersistenceError> {
        self.db.conn().execute(
            "INSERT INTO sync_fields (field_name, enabled) VALUES (?1, ?2)
             ON CONFLICT(field_name) DO UPDATE SET enabled = excluded.enabled",
            params![field, enabled],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_fields_are_enabled() {
        let snapshot = PolicySnapshot::default();
        assert!(snapshot.is_field_enabled("status"));
        assert!(snapshot.is_field_enabled("anything"));
        assert!(snapshot.enabled_fields().is_empty());
        assert_eq!(snapshot.fields_for_dispatch_push(), vec!["status", "comment"]);
    }

    #[test]
    fn disabled_rows_are_respected() {
        let db = Database::open_memory().unwrap();
        let store = SyncPolicyStore::new(&db);
        store.set_field("status", false).unwrap();
        store.set_field("comment", true).unwrap();

        let snapshot = store.load().unwrap();
        assert!(!snapshot.is_field_enabled("status"));
        assert!(snapshot.is_field_enabled("comment"));
        assert_eq!(snapshot.enabled_fields(), vec!["comment"]);
        assert_eq!(snapshot.fields_for_dispatch_push(), vec!["comment"]);
    }

    #[test]
    fn set_field_upserts() {
        let db = Database::open_memory().unwrap();
        let store = SyncPolicyStore::new(&db);
        store.set_field("status", false).unwrap();
        store.set_field("status", true).unwrap();

        let rows = store.rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].enabled);
    }
}
