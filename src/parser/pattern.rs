//! Regex-based parser for the `pool="..." ... upstream_status="..."` format.

use regex::Regex;

use crate::parser::{parse_status, LineParser, LogEvent};

const DEFAULT_PATTERN: &str = r#"pool="([^"]*)".*upstream_status="([^"]*)""#;

/// Matches a pool token followed later in the line by an upstream status token.
#[derive(Debug, Clone)]
pub struct RegexLineParser {
    pattern: Regex,
}

impl RegexLineParser {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_PATTERN).expect("default pattern compiles"),
        }
    }

    /// Use a custom pattern. Capture group 1 is the pool, group 2 the status.
    pub fn with_pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl Default for RegexLineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser for RegexLineParser {
    fn parse(&self, line: &str) -> Option<LogEvent> {
        let caps = self.pattern.captures(line)?;
        let pool = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let status = caps.get(2).map(|m| parse_status(m.as_str())).unwrap_or(0);
        Some(LogEvent::new(pool, status))
    }
}
