//! Foreground periodic sync loop.

use std::time::Duration;

use clap::Args;
use fleetsync_core::{AuditLog, SyncDirection, SystemStatusTracker};

use super::common::{build_engine, load_config, open_database, CliResult};

#[derive(Args)]
pub struct WatchArgs {
    /// both, dispatch or asset
    #[arg(long, default_value = "both")]
    pub direction: SyncDirection,
    /// Run passes even while auto-sync is disabled in system status
    #[arg(long)]
    pub force: bool,
}

/// Run passes on the configured interval until interrupted.
///
/// The auto-sync flag and interval are re-read from system status every
/// cycle so `fleetsync status enable-auto-sync` takes effect without a
/// restart; the policy snapshot is reloaded before each pass for the
/// same reason.
pub fn run(args: WatchArgs) -> CliResult {
    let config = load_config()?;
    let db = open_database()?;
    let mut engine = build_engine(&db, &config)?;

    tracing::info!("watch loop started, mode {:?}", args.direction);
    loop {
        let snapshot = SystemStatusTracker::new(&db).snapshot()?;
        let enabled = snapshot.as_ref().map_or(false, |s| s.auto_sync_enabled);
        let interval = snapshot
            .as_ref()
            .map(|s| s.sync_interval_secs.max(1) as u64)
            .unwrap_or(config.sync.auto_sync_interval_secs);

        if enabled || args.force {
            engine.reload_policy()?;
            match engine.run_pass(args.direction) {
                Ok(outcomes) => {
                    let failed = outcomes.iter().filter(|o| !o.success).count();
                    println!(
                        "pass complete: {} outcome(s), {} failed",
                        outcomes.len(),
                        failed
                    );
                }
                // A failed fetch is transient; keep the loop alive.
                Err(e) => tracing::warn!("pass failed: {e}"),
            }

            if let Err(e) = AuditLog::new(&db).purge_older_than(config.sync.log_retention_days) {
                tracing::warn!("audit retention purge failed: {e}");
            }
        } else {
            tracing::debug!("auto-sync disabled, idling");
        }

        std::thread::sleep(Duration::from_secs(interval));
    }
}
