//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the watcher.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the watcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct WatcherConfig {
    /// Where log lines come from.
    pub source: SourceConfig,

    /// Window and error-rate settings.
    pub detection: DetectionConfig,

    /// Cooldown and maintenance settings.
    pub alerting: AlertingConfig,

    /// Outbound notification channel.
    pub notifier: NotifierConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// How lines are delivered to the ingestion loop.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Poll the file directly.
    #[default]
    File,
    /// Read the stdout of an external follower process (`tail -F`).
    Process,
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(SourceKind::File),
            "process" => Ok(SourceKind::Process),
            other => Err(format!("unknown source kind '{}'", other)),
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::File => write!(f, "file"),
            SourceKind::Process => write!(f, "process"),
        }
    }
}

/// Log source configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    /// Follower variant.
    pub kind: SourceKind,

    /// Access log path.
    pub path: String,

    /// Command used by the process variant. `{path}` is substituted.
    pub command: Vec<String>,

    /// Interval between existence checks while waiting for the log (ms).
    pub startup_poll_ms: u64,

    /// Sleep when no new data is available (ms).
    pub read_poll_ms: u64,

    /// Base delay before respawning an exited follower process (ms).
    pub restart_base_ms: u64,

    /// Maximum respawn delay (ms).
    pub restart_max_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::File,
            path: "/var/log/nginx/access.log".to_string(),
            command: vec![
                "tail".to_string(),
                "-F".to_string(),
                "-n".to_string(),
                "0".to_string(),
                "{path}".to_string(),
            ],
            startup_poll_ms: 1000,
            read_poll_ms: 100,
            restart_base_ms: 500,
            restart_max_ms: 30_000,
        }
    }
}

/// Sliding window and error-rate configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    /// Number of recent requests kept in the window.
    pub window_size: usize,

    /// Error percentage (0-100) above which an alert fires.
    pub error_rate_threshold: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            window_size: 200,
            error_rate_threshold: 2.0,
        }
    }
}

/// Alert suppression configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AlertingConfig {
    /// Minimum seconds between two alerts of the same kind.
    pub cooldown_secs: u64,

    /// Mute failover alerts (planned maintenance).
    pub maintenance_mode: bool,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 300,
            maintenance_mode: false,
        }
    }
}

/// Notification channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NotifierConfig {
    /// Slack-compatible incoming webhook. Unset means stdout only.
    pub webhook_url: Option<String>,

    /// Send timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: 5,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// The subset of configuration that may change while running.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertSettings {
    pub error_rate_threshold: f64,
    pub cooldown_secs: u64,
    pub maintenance_mode: bool,
}

impl AlertSettings {
    pub fn cooldown(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cooldown_secs)
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        WatcherConfig::default().alert_settings()
    }
}

impl WatcherConfig {
    /// Extract the hot-reloadable alert settings.
    pub fn alert_settings(&self) -> AlertSettings {
        AlertSettings {
            error_rate_threshold: self.detection.error_rate_threshold,
            cooldown_secs: self.alerting.cooldown_secs,
            maintenance_mode: self.alerting.maintenance_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = WatcherConfig::default();
        assert_eq!(config.detection.window_size, 200);
        assert_eq!(config.detection.error_rate_threshold, 2.0);
        assert_eq!(config.alerting.cooldown_secs, 300);
        assert!(!config.alerting.maintenance_mode);
        assert_eq!(config.notifier.timeout_secs, 5);
        assert!(config.notifier.webhook_url.is_none());
        assert_eq!(config.source.kind, SourceKind::File);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: WatcherConfig = toml::from_str(
            r#"
            [detection]
            window_size = 500

            [source]
            kind = "process"
            "#,
        )
        .unwrap();

        assert_eq!(config.detection.window_size, 500);
        assert_eq!(config.detection.error_rate_threshold, 2.0);
        assert_eq!(config.source.kind, SourceKind::Process);
        assert_eq!(config.source.path, "/var/log/nginx/access.log");
    }

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!("FILE".parse::<SourceKind>().unwrap(), SourceKind::File);
        assert_eq!(" process ".parse::<SourceKind>().unwrap(), SourceKind::Process);
        assert!("journald".parse::<SourceKind>().is_err());
    }
}
