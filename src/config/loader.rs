//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::{LogFormat, SourceKind, WatcherConfig};
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_ERROR_RATE_THRESHOLD: &str = "ERROR_RATE_THRESHOLD";
pub const ENV_WINDOW_SIZE: &str = "WINDOW_SIZE";
pub const ENV_ALERT_COOLDOWN_SEC: &str = "ALERT_COOLDOWN_SEC";
pub const ENV_MAINTENANCE_MODE: &str = "MAINTENANCE_MODE";
pub const ENV_SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
pub const ENV_WEBHOOK_TIMEOUT_SEC: &str = "WEBHOOK_TIMEOUT_SEC";
pub const ENV_LOG_PATH: &str = "LOG_PATH";
pub const ENV_LOG_SOURCE: &str = "LOG_SOURCE";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: '{value}'")]
    Env { key: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<WatcherConfig, ConfigError> {
    let config = read_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Build the effective configuration: defaults, then the optional file,
/// then process environment overrides.
pub fn load_layered(path: Option<&Path>) -> Result<WatcherConfig, ConfigError> {
    let base = match path {
        Some(p) => read_file(p)?,
        None => WatcherConfig::default(),
    };
    let config = apply_env_overrides(base, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Command-line settings that win over the file and the environment.
///
/// Held apart from the loaded config so every reload can re-apply them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub log_path: Option<String>,
    pub source_kind: Option<SourceKind>,
    pub log_format: Option<LogFormat>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut WatcherConfig) {
        if let Some(path) = &self.log_path {
            config.source.path = path.clone();
        }
        if let Some(kind) = self.source_kind {
            config.source.kind = kind;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
    }
}

fn read_file(path: &Path) -> Result<WatcherConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment-style overrides using `lookup` to resolve keys.
///
/// Empty values are treated as unset.
pub fn apply_env_overrides<F>(
    mut config: WatcherConfig,
    lookup: F,
) -> Result<WatcherConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(ENV_ERROR_RATE_THRESHOLD) {
        config.detection.error_rate_threshold = parse_env(ENV_ERROR_RATE_THRESHOLD, &v)?;
    }
    if let Some(v) = get(ENV_WINDOW_SIZE) {
        config.detection.window_size = parse_env(ENV_WINDOW_SIZE, &v)?;
    }
    if let Some(v) = get(ENV_ALERT_COOLDOWN_SEC) {
        config.alerting.cooldown_secs = parse_env(ENV_ALERT_COOLDOWN_SEC, &v)?;
    }
    if let Some(v) = get(ENV_MAINTENANCE_MODE) {
        config.alerting.maintenance_mode = parse_bool(&v);
    }
    if let Some(v) = get(ENV_SLACK_WEBHOOK_URL) {
        config.notifier.webhook_url = Some(v.trim().to_string());
    }
    if let Some(v) = get(ENV_WEBHOOK_TIMEOUT_SEC) {
        config.notifier.timeout_secs = parse_env(ENV_WEBHOOK_TIMEOUT_SEC, &v)?;
    }
    if let Some(v) = get(ENV_LOG_PATH) {
        config.source.path = v.trim().to_string();
    }
    if let Some(v) = get(ENV_LOG_SOURCE) {
        config.source.kind = SourceKind::from_str(&v).map_err(|_| ConfigError::Env {
            key: ENV_LOG_SOURCE,
            value: v.clone(),
        })?;
    }

    Ok(config)
}

fn parse_env<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        key,
        value: value.to_string(),
    })
}

/// `true` and `1` (any case) enable a flag; everything else disables it.
pub fn parse_bool(value: &str) -> bool {
    let v = value.trim();
    v.eq_ignore_ascii_case("true") || v == "1"
}
