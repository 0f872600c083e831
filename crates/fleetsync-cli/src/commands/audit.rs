//! Audit trail queries.

use clap::Subcommand;
use fleetsync_core::{AuditLog, ReconciliationOutcome};

use super::common::{open_database, CliResult};

#[derive(Subcommand)]
pub enum AuditAction {
    /// Most recent outcomes, newest first
    Recent {
        #[arg(long, default_value_t = 50)]
        limit: u32,
        /// Emit JSON instead of the table
        #[arg(long)]
        json: bool,
    },
    /// Aggregate counters over a time window
    Stats {
        #[arg(long, default_value_t = 24)]
        window_hours: i64,
        /// Emit JSON instead of the table
        #[arg(long)]
        json: bool,
    },
    /// Outcomes for one vehicle
    History {
        vehicle: String,
        #[arg(long, default_value_t = 7)]
        days: i64,
        /// Emit JSON instead of the table
        #[arg(long)]
        json: bool,
    },
    /// Vehicles with failures in the last 24 hours
    Failures,
    /// Delete outcomes older than the retention window
    Purge {
        #[arg(long, default_value_t = 30)]
        days: i64,
    },
}

pub fn run(action: AuditAction) -> CliResult {
    let db = open_database()?;
    let log = AuditLog::new(&db);

    match action {
        AuditAction::Recent { limit, json } => {
            let outcomes = log.recent(limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcomes)?);
                return Ok(());
            }
            if outcomes.is_empty() {
                println!("No outcomes recorded.");
                return Ok(());
            }
            for outcome in &outcomes {
                print_row(outcome);
            }
        }
        AuditAction::Stats { window_hours, json } => {
            let stats = log.stats(window_hours)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
                return Ok(());
            }
            println!("Window:           last {window_hours}h");
            println!("Outcomes:         {}", stats.total);
            println!("Successful:       {}", stats.successful);
            println!("Vehicles touched: {}", stats.distinct_vehicles);
            match stats.last_outcome_time {
                Some(ts) => println!("Last outcome:     {}", ts.to_rfc3339()),
                None => println!("Last outcome:     none"),
            }
        }
        AuditAction::History { vehicle, days, json } => {
            let outcomes = log.vehicle_history(&vehicle, days)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcomes)?);
                return Ok(());
            }
            if outcomes.is_empty() {
                println!("No outcomes for '{vehicle}' in the last {days} day(s).");
                return Ok(());
            }
            for outcome in &outcomes {
                print_row(outcome);
            }
        }
        AuditAction::Failures => {
            let failing = log.failing_vehicles(24)?;
            if failing.is_empty() {
                println!("No failing vehicles in the last 24h.");
                return Ok(());
            }
            for vehicle in &failing {
                println!(
                    "{:<16} {} failure(s), last at {}: {}",
                    vehicle.vehicle_name,
                    vehicle.failure_count,
                    vehicle.last_attempt.to_rfc3339(),
                    vehicle.last_error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        AuditAction::Purge { days } => {
            let deleted = log.purge_older_than(days)?;
            println!("Deleted {deleted} outcome(s) older than {days} day(s).");
        }
    }
    Ok(())
}

fn print_row(outcome: &ReconciliationOutcome) {
    let mark = if outcome.success { '\u{2713}' } else { '\u{2717}' };
    let direction = outcome
        .sync_direction
        .map(|d| d.as_str())
        .unwrap_or("undecided");
    println!(
        "{} {} {:<16} [{direction}] {}",
        outcome.created_at.format("%Y-%m-%d %H:%M:%S"),
        mark,
        outcome.vehicle_name,
        if outcome.success {
            outcome.fields_synced.join(", ")
        } else {
            outcome
                .error_message
                .clone()
                .unwrap_or_else(|| "unknown error".to_string())
        }
    );
}
