//! Error types for fleetsync-core.
//!
//! The hierarchy mirrors the failure domains of a reconciliation pass:
//! remote transport, status vocabulary, local persistence and policy
//! loading each fail independently and are handled differently by the
//! engine (see `engine.rs`).

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which external system a remote failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemKind {
    Dispatch,
    Asset,
}

impl fmt::Display for SystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemKind::Dispatch => write!(f, "dispatch"),
            SystemKind::Asset => write!(f, "asset"),
        }
    }
}

/// Top-level error type for fleetsync-core.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Transport or non-success response from an external system.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Status code with no defined mapping.
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),

    /// Audit log / status tracker / policy storage failure.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Sync policy could not be loaded at engine construction.
    #[error("failed to load sync policy: {0}")]
    PolicyLoad(String),

    /// Configuration errors.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Single-vehicle sync was requested for a vehicle missing from
    /// one or both systems.
    #[error("vehicle not found in both systems: {0}")]
    VehicleNotMatched(String),
}

/// Failures talking to an external system.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Non-success response, with the transport status code and raw body.
    #[error("{system} API request failed with status {status}: {body}")]
    Status {
        system: SystemKind,
        status: u16,
        body: String,
    },

    /// Transport-level failure (connect, TLS, timeout, body decode).
    #[error("{system} API transport error: {source}")]
    Transport {
        system: SystemKind,
        #[source]
        source: reqwest::Error,
    },

    /// Response arrived but did not have the expected shape.
    #[error("{system} API returned an unexpected payload: {message}")]
    Payload { system: SystemKind, message: String },

    /// Read-merge-write could not find the record to merge into.
    #[error("asset {id} not present in the remote record set")]
    AssetMissing { id: i64 },
}

/// A status code with no defined translation. Never silently defaulted:
/// an unmapped status would otherwise desync without a trace.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VocabularyError {
    #[error("no asset status mapped for FMS code {0}")]
    UnmappedFms(i64),

    #[error("no FMS code mapped for asset status '{0}'")]
    UnmappedAsset(String),
}

/// Local SQLite persistence failures.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to open database at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("stored value could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid stored timestamp '{0}'")]
    Timestamp(String),

    #[error("could not determine data directory: {0}")]
    DataDir(String),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("missing required configuration key: {0}")]
    MissingKey(String),

    #[error("could not determine configuration directory: {0}")]
    DataDir(String),
}

/// Result type alias for SyncError.
pub type Result<T, E = SyncError> = std::result::Result<T, E>;
