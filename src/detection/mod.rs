//! Detection subsystem.
//!
//! # Data Flow
//! ```text
//! LogEvent
//!     → window.rs (push status, evict oldest)
//!     → failover.rs (compare pool with last known pool)
//!     → error_rate.rs (5xx share of the window vs threshold)
//!     → Alert conditions for the dispatcher
//! ```
//!
//! # Design Decisions
//! - Window and failover state are plain owned values, no locking
//! - Evaluation never mutates the window
//! - Error rate waits for a minimum sample before producing a verdict

pub mod error_rate;
pub mod failover;
pub mod window;

pub use error_rate::{ErrorRateEvaluator, MIN_SAMPLES};
pub use failover::FailoverDetector;
pub use window::SlidingWindow;
