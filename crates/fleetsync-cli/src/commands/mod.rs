pub mod audit;
pub mod common;
pub mod policy;
pub mod status;
pub mod sync;
pub mod watch;
