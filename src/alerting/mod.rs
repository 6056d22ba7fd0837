//! Alerting subsystem.
//!
//! # Data Flow
//! ```text
//! Alert condition (failover / error_rate)
//!     → dispatcher.rs: maintenance check (failover only)
//!     → cooldown.rs: per-kind minimum interval
//!     → notifier (webhook) or `[ALERT]` line on stdout
//!     → cooldown.rs records the firing on success
//! ```
//!
//! # Design Decisions
//! - Cooldowns are independent per alert kind
//! - A failed send does not start a cooldown, so the next trigger retries
//! - Dispatch returns an explicit outcome instead of swallowing errors

pub mod cooldown;
pub mod dispatcher;

pub use cooldown::CooldownTracker;
pub use dispatcher::{AlertDispatcher, DispatchOutcome, SuppressReason};

use std::fmt;

/// Which rule produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    Failover,
    ErrorRate,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Failover => "failover",
            AlertKind::ErrorRate => "error_rate",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An alert condition raised by detection.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The active pool changed.
    Failover {
        from: String,
        to: String,
        window_len: usize,
    },
    /// The rolling 5xx rate crossed the threshold.
    ErrorRate {
        rate: f64,
        errors: usize,
        total: usize,
    },
}

impl Alert {
    pub fn kind(&self) -> AlertKind {
        match self {
            Alert::Failover { .. } => AlertKind::Failover,
            Alert::ErrorRate { .. } => AlertKind::ErrorRate,
        }
    }

    /// Operator-facing message text.
    pub fn message(&self) -> String {
        match self {
            Alert::Failover {
                from,
                to,
                window_len,
            } => format!("Failover: {} → {} (window: {} requests)", from, to, window_len),
            Alert::ErrorRate {
                rate,
                errors,
                total,
            } => format!("High Error Rate: {:.1}% ({}/{})", rate, errors, total),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
