//! Per-field sync policy management.

use clap::Subcommand;
use fleetsync_core::SyncPolicyStore;

use super::common::{open_database, CliResult};

#[derive(Subcommand)]
pub enum PolicyAction {
    /// List configured policy rows
    Show,
    /// Enable syncing of a field toward the dispatch system
    Enable { field: String },
    /// Disable syncing of a field toward the dispatch system
    Disable { field: String },
}

pub fn run(action: PolicyAction) -> CliResult {
    let db = open_database()?;
    let store = SyncPolicyStore::new(&db);

    match action {
        PolicyAction::Show => {
            let rows = store.rows()?;
            if rows.is_empty() {
                println!("No policy rows configured; all fields sync by default.");
                return Ok(());
            }
            for row in rows {
                println!(
                    "{:<12} {}",
                    row.field,
                    if row.enabled { "enabled" } else { "disabled" }
                );
            }
        }
        PolicyAction::Enable { field } => {
            store.set_field(&field, true)?;
            println!("Field '{field}' enabled.");
        }
        PolicyAction::Disable { field } => {
            store.set_field(&field, false)?;
            println!("Field '{field}' disabled.");
        }
    }
    Ok(())
}
