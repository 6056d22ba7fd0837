//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (threshold is a percentage, intervals > 0)
//! - Check the webhook URL is a usable http(s) endpoint
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WatcherConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system (startup and reload)

use thiserror::Error;
use url::Url;

use crate::config::schema::{SourceKind, WatcherConfig};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("error_rate_threshold must be within 0..=100, got {0}")]
    ThresholdOutOfRange(f64),

    #[error("window_size must be at least 1")]
    EmptyWindow,

    #[error("invalid webhook_url '{0}'")]
    InvalidWebhookUrl(String),

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("source path must not be empty")]
    EmptySourcePath,

    #[error("process source requires a command")]
    EmptyCommand,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &WatcherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let threshold = config.detection.error_rate_threshold;
    if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
        errors.push(ValidationError::ThresholdOutOfRange(threshold));
    }

    if config.detection.window_size == 0 {
        errors.push(ValidationError::EmptyWindow);
    }

    if let Some(raw) = &config.notifier.webhook_url {
        let ok = Url::parse(raw)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
            .unwrap_or(false);
        if !ok {
            errors.push(ValidationError::InvalidWebhookUrl(raw.clone()));
        }
    }

    if config.notifier.timeout_secs == 0 {
        errors.push(ValidationError::ZeroInterval("notifier.timeout_secs"));
    }
    if config.source.startup_poll_ms == 0 {
        errors.push(ValidationError::ZeroInterval("source.startup_poll_ms"));
    }
    if config.source.read_poll_ms == 0 {
        errors.push(ValidationError::ZeroInterval("source.read_poll_ms"));
    }

    if config.source.path.trim().is_empty() {
        errors.push(ValidationError::EmptySourcePath);
    }
    if config.source.kind == SourceKind::Process && config.source.command.is_empty() {
        errors.push(ValidationError::EmptyCommand);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
