//! Resilience helpers.
//!
//! # Data Flow
//! ```text
//! Notification send:
//!     → timeouts.rs (deadline, failure is reported, never retried)
//!
//! Follower process exit:
//!     → backoff.rs (exponential delay with jitter before respawn)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Jittered backoff prevents tight respawn loops

pub mod backoff;
pub mod timeouts;
