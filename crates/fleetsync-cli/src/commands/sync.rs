//! Manual reconciliation runs.

use clap::Subcommand;
use fleetsync_core::{ReconciliationOutcome, SyncDirection};

use super::common::{build_engine, load_config, open_database, CliResult};

#[derive(Subcommand)]
pub enum SyncAction {
    /// Reconcile every matched vehicle once
    Run {
        /// both, dispatch or asset
        #[arg(long, default_value = "both")]
        direction: SyncDirection,
    },
    /// Reconcile a single vehicle by call number or name
    Vehicle {
        vehicle: String,
        /// both, dispatch or asset
        #[arg(long, default_value = "both")]
        direction: SyncDirection,
    },
}

pub fn run(action: SyncAction) -> CliResult {
    let config = load_config()?;
    let db = open_database()?;
    let mut engine = build_engine(&db, &config)?;

    match action {
        SyncAction::Run { direction } => {
            let outcomes = engine.run_pass(direction)?;
            if outcomes.is_empty() {
                println!("All vehicles in agreement, nothing to do.");
                return Ok(());
            }
            for outcome in &outcomes {
                print_outcome(outcome);
            }
            let failed = outcomes.iter().filter(|o| !o.success).count();
            println!(
                "{} vehicle(s) synced, {} failed.",
                outcomes.len() - failed,
                failed
            );
        }
        SyncAction::Vehicle { vehicle, direction } => {
            match engine.sync_vehicle(&vehicle, direction)? {
                Some(outcome) => print_outcome(&outcome),
                None => println!("{vehicle}: already in agreement."),
            }
        }
    }
    Ok(())
}

fn print_outcome(outcome: &ReconciliationOutcome) {
    let direction = outcome
        .sync_direction
        .map(|d| d.as_str())
        .unwrap_or("undecided");
    if outcome.success {
        println!(
            "  \u{2713} {} [{direction}] fields: {}",
            outcome.vehicle_name,
            outcome.fields_synced.join(", ")
        );
    } else {
        println!(
            "  \u{2717} {} [{direction}] {}",
            outcome.vehicle_name,
            outcome.error_message.as_deref().unwrap_or("unknown error")
        );
    }
}
