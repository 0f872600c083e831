//! System status display and auto-sync settings.

use clap::Subcommand;
use fleetsync_core::SystemStatusTracker;

use super::common::{open_database, CliResult};

#[derive(Subcommand)]
pub enum StatusAction {
    /// Show pass bookkeeping and auto-sync settings
    Show {
        /// Emit JSON instead of the table
        #[arg(long)]
        json: bool,
    },
    /// Enable the periodic sync loop
    EnableAutoSync {
        /// Seconds between passes
        #[arg(long, default_value_t = 300)]
        interval: i64,
    },
    /// Disable the periodic sync loop
    DisableAutoSync,
}

pub fn run(action: StatusAction) -> CliResult {
    let db = open_database()?;
    let tracker = SystemStatusTracker::new(&db);

    match action {
        StatusAction::Show { json } => match tracker.snapshot()? {
            Some(snapshot) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&snapshot)?);
                    return Ok(());
                }
                match snapshot.last_sync {
                    Some(ts) => println!("Last sync:      {}", ts.to_rfc3339()),
                    None => println!("Last sync:      never"),
                }
                println!("Last outcomes:  {}", snapshot.last_sync_count);
                println!("Total passes:   {}", snapshot.total_syncs);
                println!(
                    "Auto-sync:      {} (every {}s)",
                    if snapshot.auto_sync_enabled { "on" } else { "off" },
                    snapshot.sync_interval_secs
                );
            }
            None => println!("No passes recorded yet."),
        },
        StatusAction::EnableAutoSync { interval } => {
            tracker.set_auto_sync(true, interval)?;
            println!("Auto-sync enabled, interval {interval}s.");
        }
        StatusAction::DisableAutoSync => {
            // Keep the configured interval around for the next enable.
            let interval = tracker
                .snapshot()?
                .map_or(300, |s| s.sync_interval_secs);
            tracker.set_auto_sync(false, interval)?;
            println!("Auto-sync disabled.");
        }
    }
    Ok(())
}
