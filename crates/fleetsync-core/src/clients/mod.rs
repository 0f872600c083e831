//! Clients for the two external vehicle systems.
//!
//! The engine depends on the `DispatchApi`/`AssetApi` contracts in
//! `traits`, not on the HTTP transport; `dispatch` and `asset` are the
//! production reqwest-backed implementations.

pub mod asset;
pub mod dispatch;
pub mod rate_limit;
pub mod traits;

pub use asset::AssetClient;
pub use dispatch::DispatchClient;
pub use rate_limit::RateLimiter;
pub use traits::{AssetApi, DispatchApi};
