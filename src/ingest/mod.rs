//! Ingestion subsystem.
//!
//! # Data Flow
//! ```text
//! LineSource (file / process / replay / channel)
//!     → pipeline.rs: one line at a time, in delivery order
//!     → parser (no match: line dropped)
//!     → monitor.rs: window push, failover check, error-rate check
//!     → AlertDispatcher (awaited in-line)
//! ```
//!
//! # Design Decisions
//! - Single task owns all detection state; no locks on the hot path
//! - Alert failures never stop ingestion
//! - Shutdown abandons an in-flight send and closes the source

pub mod monitor;
pub mod pipeline;

pub use monitor::Monitor;
pub use pipeline::{Pipeline, PipelineStats, StopReason};
