//! TOML-based application configuration.
//!
//! Holds the credentials and endpoints for both external systems plus
//! the scheduler knobs. Stored at `~/.config/fleetsync/config.toml`
//! (or `fleetsync-dev` with FLEETSYNC_ENV=dev).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::storage::data_dir;

/// Dispatch system connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_dispatch_url")]
    pub base_url: String,
    #[serde(default)]
    pub access_key: String,
}

/// Asset-tracking system connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub bu_id: i64,
    #[serde(default)]
    pub api_key: String,
}

/// Scheduler and housekeeping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_interval")]
    pub auto_sync_interval_secs: u64,
    #[serde(default = "default_retention")]
    pub log_retention_days: i64,
}

/// Application configuration, serialized to/from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub asset: AssetConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

fn default_dispatch_url() -> String {
    "https://app.divera247.com/api/v2".into()
}
fn default_interval() -> u64 {
    300
}
fn default_retention() -> i64 {
    30
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            base_url: default_dispatch_url(),
            access_key: String::new(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_sync_interval_secs: default_interval(),
            log_retention_days: default_retention(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing out a default file on first run so the
    /// operator has a template to fill in.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content, &path),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from an explicit path; missing files are an error here.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &std::path::Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Check that every credential a sync pass needs is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch.base_url.is_empty() {
            return Err(ConfigError::MissingKey("dispatch.base_url".into()));
        }
        if self.dispatch.access_key.is_empty() {
            return Err(ConfigError::MissingKey("dispatch.access_key".into()));
        }
        if self.asset.base_url.is_empty() {
            return Err(ConfigError::MissingKey("asset.base_url".into()));
        }
        if self.asset.api_key.is_empty() {
            return Err(ConfigError::MissingKey("asset.api_key".into()));
        }
        if self.asset.bu_id <= 0 {
            return Err(ConfigError::MissingKey("asset.bu_id".into()));
        }
        Ok(())
    }
}
