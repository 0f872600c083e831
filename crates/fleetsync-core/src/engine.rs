//! The reconciliation engine.
//!
//! One pass: load policy (done at construction), fetch both vehicle
//! lists, join them, then walk the matched pairs sequentially applying
//! at most one corrective write per mismatched pair. Per-vehicle
//! failures are isolated into their outcome; only a whole-pass fetch
//! failure aborts and propagates. Audit and tracker writes are
//! bookkeeping -- their failures are logged and swallowed so they never
//! mask an otherwise-successful sync.
//!
//! Passes must not overlap; the surrounding scheduler is responsible
//! for serializing triggers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::clients::{AssetApi, DispatchApi};
use crate::error::{SyncError, VocabularyError};
use crate::matcher;
use crate::model::{
    MatchedPair, OutcomeDirection, ReconciliationOutcome, SyncDirection,
};
use crate::policy::{PolicySnapshot, SyncPolicyStore};
use crate::storage::{AuditLog, Database, SystemStatusTracker};
use crate::vocabulary;

/// Bidirectional reconciliation engine over one dispatch and one asset
/// client. Holds the persistence handle it was constructed with -- no
/// process-wide singleton.
pub struct ReconciliationEngine<'a, D, A> {
    db: &'a Database,
    dispatch: D,
    asset: A,
    policy: PolicySnapshot,
    cancel: Arc<AtomicBool>,
}

impl<'a, D: DispatchApi, A: AssetApi> ReconciliationEngine<'a, D, A> {
    /// Construct the engine, loading the sync policy once. A policy load
    /// failure fails construction: running with undefined policy is not
    /// an option.
    pub fn new(db: &'a Database, dispatch: D, asset: A) -> Result<Self, SyncError> {
        let policy = SyncPolicyStore::new(db)
            .load()
            .map_err(|e| SyncError::PolicyLoad(e.to_string()))?;
        Ok(Self {
            db,
            dispatch,
            asset,
            policy,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag checked between vehicles; setting it aborts the pass cleanly
    /// after the in-flight vehicle (writes are atomic single calls,
    /// never split). The flag is consumed by the cancelled pass.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Re-read the policy rows. Long-lived engines call this before a
    /// pass to pick up dashboard changes.
    pub fn reload_policy(&mut self) -> Result<(), SyncError> {
        self.policy = SyncPolicyStore::new(self.db)
            .load()
            .map_err(|e| SyncError::PolicyLoad(e.to_string()))?;
        Ok(())
    }

    /// Run one reconciliation pass.
    ///
    /// Returns every attempted outcome, including failed ones -- there
    /// is no all-or-nothing semantics. Pairs already in agreement
    /// produce no outcome and no write.
    pub fn run_pass(
        &mut self,
        direction: SyncDirection,
    ) -> Result<Vec<ReconciliationOutcome>, SyncError> {
        let started_at = Utc::now();
        self.asset.reset_cache();

        let vehicles = self.dispatch.fetch_vehicles()?;
        let assets = self.asset.fetch_assets()?;
        let pairs = matcher::match_vehicles(&vehicles, &assets);
        tracing::info!(
            "reconciliation pass started: {} matched vehicles, mode {:?}",
            pairs.len(),
            direction
        );

        let mut outcomes = Vec::new();
        for pair in pairs.values() {
            if self.cancel.swap(false, Ordering::Relaxed) {
                tracing::info!(
                    "pass cancelled after {} of {} vehicles",
                    outcomes.len(),
                    pairs.len()
                );
                break;
            }
            if let Some(outcome) = self.reconcile_pair(pair, direction) {
                self.append_audit(&outcome);
                outcomes.push(outcome);
            }
        }

        self.record_pass(started_at, outcomes.len());
        Ok(outcomes)
    }

    /// Sync a single vehicle by its join key (or dispatch display name).
    ///
    /// Returns `None` when the pair is already in agreement. Errors if
    /// the vehicle is not present in both systems.
    pub fn sync_vehicle(
        &mut self,
        vehicle: &str,
        direction: SyncDirection,
    ) -> Result<Option<ReconciliationOutcome>, SyncError> {
        let started_at = Utc::now();
        self.asset.reset_cache();

        let vehicles = self.dispatch.fetch_vehicles()?;
        let assets = self.asset.fetch_assets()?;

        let dispatch = vehicles
            .iter()
            .find(|v| v.number == vehicle || v.name == vehicle);
        let asset = assets.iter().find(|a| a.name == vehicle);
        let (Some(dispatch), Some(asset)) = (dispatch, asset) else {
            return Err(SyncError::VehicleNotMatched(vehicle.to_string()));
        };
        let pair = MatchedPair {
            dispatch: dispatch.clone(),
            asset: asset.clone(),
        };

        let outcome = self.reconcile_pair(&pair, direction);
        if let Some(ref outcome) = outcome {
            self.append_audit(outcome);
            self.record_pass(started_at, 1);
        }
        Ok(outcome)
    }

    /// Decide and execute the sync for one matched pair.
    ///
    /// `None` means no action was needed (pair in agreement, or the
    /// push was gated off by policy) -- no outcome is recorded then.
    fn reconcile_pair(
        &mut self,
        pair: &MatchedPair,
        mode: SyncDirection,
    ) -> Option<ReconciliationOutcome> {
        let dispatch = &pair.dispatch;
        let asset = &pair.asset;

        // An unmapped asset status makes the mismatch undecidable; that
        // is a failed outcome for this vehicle, never a silent default.
        let expected_fms = match vocabulary::to_dispatch(&asset.status) {
            Ok(code) => code,
            Err(e) => return Some(self.vocabulary_failure(pair, None, &e)),
        };

        let status_mismatch = dispatch.fms_status != expected_fms;
        let comment_mismatch = dispatch.fms_note != asset.comment_or_empty();
        if !status_mismatch && !comment_mismatch {
            return None;
        }

        let direction = match mode {
            SyncDirection::TowardDispatch => OutcomeDirection::AssetToDispatch,
            SyncDirection::TowardAsset => OutcomeDirection::DispatchToAsset,
            SyncDirection::Both => {
                // Strictly later dispatch timestamp pushes to the asset
                // side; ties go toward the dispatch system.
                if dispatch.last_modified() > asset.last_modified_utc() {
                    OutcomeDirection::DispatchToAsset
                } else {
                    OutcomeDirection::AssetToDispatch
                }
            }
        };

        match direction {
            OutcomeDirection::AssetToDispatch => {
                // Policy gates dispatch-side pushes only; asset-side
                // pushes below are unconditional. Asymmetric by design.
                if !self.policy.is_field_enabled("status") {
                    tracing::debug!(
                        "skipping {}: status field disabled by policy",
                        dispatch.name
                    );
                    return None;
                }
                let result = self.dispatch.set_vehicle_status(
                    dispatch.id,
                    expected_fms,
                    asset.comment_or_empty(),
                );
                let fields = self.policy.fields_for_dispatch_push();
                Some(self.write_outcome(pair, direction, fields, result))
            }
            OutcomeDirection::DispatchToAsset => {
                let status = match vocabulary::to_asset(dispatch.fms_status) {
                    Ok(status) => status,
                    Err(e) => return Some(self.vocabulary_failure(pair, Some(direction), &e)),
                };
                let result = self
                    .asset
                    .update_asset(asset.id, status, &dispatch.fms_note);
                let fields = vec!["status".to_string(), "comment".to_string()];
                Some(self.write_outcome(pair, direction, fields, result))
            }
        }
    }

    fn write_outcome(
        &self,
        pair: &MatchedPair,
        direction: OutcomeDirection,
        fields: Vec<String>,
        result: Result<(), crate::error::RemoteError>,
    ) -> ReconciliationOutcome {
        let (success, fields_synced, error_message) = match result {
            Ok(()) => (true, fields, None),
            Err(e) => {
                tracing::warn!("sync write failed for {}: {e}", pair.dispatch.name);
                (false, Vec::new(), Some(e.to_string()))
            }
        };
        ReconciliationOutcome {
            vehicle_name: pair.dispatch.name.clone(),
            dispatch_id: pair.dispatch.id,
            asset_id: pair.asset.id,
            sync_direction: Some(direction),
            fields_synced,
            success,
            error_message,
            created_at: Utc::now(),
        }
    }

    fn vocabulary_failure(
        &self,
        pair: &MatchedPair,
        direction: Option<OutcomeDirection>,
        error: &VocabularyError,
    ) -> ReconciliationOutcome {
        tracing::warn!("vocabulary failure for {}: {error}", pair.dispatch.name);
        ReconciliationOutcome {
            vehicle_name: pair.dispatch.name.clone(),
            dispatch_id: pair.dispatch.id,
            asset_id: pair.asset.id,
            sync_direction: direction,
            fields_synced: Vec::new(),
            success: false,
            error_message: Some(error.to_string()),
            created_at: Utc::now(),
        }
    }

    fn append_audit(&self, outcome: &ReconciliationOutcome) {
        if let Err(e) = AuditLog::new(self.db).append(outcome) {
            tracing::warn!(
                "failed to record outcome for {}: {e}",
                outcome.vehicle_name
            );
        }
    }

    fn record_pass(&self, started_at: chrono::DateTime<Utc>, outcome_count: usize) {
        if let Err(e) = SystemStatusTracker::new(self.db).record_pass(started_at, outcome_count) {
            tracing::warn!("failed to update system status: {e}");
        }
    }
}
