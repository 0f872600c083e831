//! SQLite persistence: audit trail, system status and sync policy rows.

pub mod audit;
pub mod database;
pub mod status;

pub use audit::{AuditLog, AuditStats, FailingVehicle};
pub use database::Database;
pub use status::SystemStatusTracker;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/fleetsync[-dev]/` based on FLEETSYNC_ENV.
///
/// Set FLEETSYNC_ENV=dev to use a separate development data directory.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FLEETSYNC_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("fleetsync-dev")
    } else {
        base_dir.join("fleetsync")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}
