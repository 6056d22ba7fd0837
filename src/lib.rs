//! Reverse-proxy access log watcher.
//!
//! Follows an access log, tracks which upstream pool serves traffic and the
//! rolling 5xx rate, and alerts operators on failover or elevated errors.

pub mod alerting;
pub mod config;
pub mod detection;
pub mod ingest;
pub mod lifecycle;
pub mod notify;
pub mod observability;
pub mod parser;
pub mod resilience;
pub mod source;

pub use config::WatcherConfig;
pub use ingest::{Monitor, Pipeline};
pub use lifecycle::Shutdown;
