//! # Fleetsync Core Library
//!
//! Core business logic for bidirectional vehicle-availability sync
//! between a dispatch/alerting platform and an asset-tracking platform.
//! All operations are exposed through this library; the CLI binary is a
//! thin layer over it.
//!
//! ## Architecture
//!
//! - **Engine**: one reconciliation pass fetches both vehicle lists,
//!   joins them by call-sign, and applies at most one corrective write
//!   per mismatched pair, newest timestamp winning
//! - **Clients**: blocking HTTP adapters for both remotes, with a
//!   per-pass cache and rate limiting on the asset side
//! - **Storage**: SQLite audit trail, system status tracker and the
//!   per-field sync policy; TOML-based configuration
//!
//! ## Key Components
//!
//! - [`ReconciliationEngine`]: pass orchestration and direction decisions
//! - [`Database`]: audit, status and policy persistence
//! - [`Config`]: endpoints, credentials and scheduler settings

pub mod clients;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod policy;
pub mod storage;
pub mod vocabulary;

pub use clients::{AssetApi, AssetClient, DispatchApi, DispatchClient};
pub use config::Config;
pub use engine::ReconciliationEngine;
pub use error::{
    ConfigError, PersistenceError, RemoteError, SyncError, SystemKind, VocabularyError,
};
pub use model::{
    AssetRecord, DispatchVehicle, OutcomeDirection, ReconciliationOutcome, SyncDirection,
    SystemStatusSnapshot,
};
pub use policy::{FieldPolicy, PolicySnapshot, SyncPolicyStore};
pub use storage::{AuditLog, AuditStats, Database, FailingVehicle, SystemStatusTracker};
