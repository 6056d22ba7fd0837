//! Access log line parsing.
//!
//! # Responsibilities
//! - Extract the upstream pool label and final upstream status from a line
//! - Downgrade anything unparseable to status 0 instead of failing
//!
//! # Design Decisions
//! - Parsing sits behind the `LineParser` trait so the matching strategy
//!   can change without touching detection or alerting
//! - Parsers are pure: no state, no side effects

pub mod pattern;

pub use pattern::RegexLineParser;

/// A request observed in the access log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Upstream pool that served the request. May be empty.
    pub pool: String,
    /// Final upstream status; 0 when unknown.
    pub status: u16,
}

impl LogEvent {
    pub fn new(pool: impl Into<String>, status: u16) -> Self {
        Self {
            pool: pool.into(),
            status,
        }
    }

    /// True for 5xx statuses.
    pub fn is_server_error(&self) -> bool {
        is_server_error(self.status)
    }
}

/// Turns one raw log line into an event, or `None` for unrelated lines.
pub trait LineParser: Send + Sync {
    fn parse(&self, line: &str) -> Option<LogEvent>;
}

pub fn is_server_error(status: u16) -> bool {
    status >= 500
}

/// Parse an `upstream_status` value.
///
/// When a request went through several upstreams the value is a
/// comma-separated list; only the last entry counts. `-` and anything that
/// is not an integer in range map to 0.
pub fn parse_status(raw: &str) -> u16 {
    let last = raw.rsplit(',').next().unwrap_or("").trim();
    if last == "-" {
        return 0;
    }
    last.parse().unwrap_or(0)
}
