//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the notifier, detection state and dispatcher from configuration
//! - Start reload listeners (config file watcher, SIGHUP)
//! - Run the ingestion loop until shutdown
//!
//! # Design Decisions
//! - Fail fast: an unusable notifier or source is a startup error
//! - Reload tasks only ever touch the shared alert settings

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::alerting::AlertDispatcher;
use crate::config::watcher::{apply_update, ConfigWatcher};
use crate::config::{
    ConfigOverrides, NotifierConfig, SharedSettings, UpdateOutcome, WatcherConfig,
};
use crate::ingest::{Monitor, Pipeline, StopReason};
use crate::lifecycle::signals::spawn_reload_listener;
use crate::lifecycle::Shutdown;
use crate::notify::{Notifier, NotifyError, SlackWebhook};
use crate::parser::RegexLineParser;
use crate::source::LineSource;

/// Errors that prevent the watcher from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build notifier: {0}")]
    Notifier(#[from] NotifyError),
}

/// Build the webhook notifier, or `None` when no URL is configured.
pub fn build_notifier(
    config: &NotifierConfig,
) -> Result<Option<Arc<dyn Notifier>>, StartupError> {
    match &config.webhook_url {
        Some(url) => {
            let webhook = SlackWebhook::new(url.clone(), Duration::from_secs(config.timeout_secs))?;
            Ok(Some(Arc::new(webhook)))
        }
        None => Ok(None),
    }
}

/// Build a pipeline and the settings handle it reads from.
pub fn build_pipeline(
    config: &WatcherConfig,
    notifier: Option<Arc<dyn Notifier>>,
) -> (Pipeline, SharedSettings) {
    let settings: SharedSettings = Arc::new(ArcSwap::from_pointee(config.alert_settings()));
    let dispatcher = AlertDispatcher::new(
        notifier,
        settings.clone(),
        Duration::from_secs(config.notifier.timeout_secs),
    );
    let pipeline = Pipeline::new(
        Box::new(RegexLineParser::new()),
        Monitor::new(config.detection.window_size),
        dispatcher,
        settings.clone(),
    );
    (pipeline, settings)
}

/// Log the effective configuration.
pub fn log_banner(config: &WatcherConfig, source: &dyn LineSource, has_notifier: bool) {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        source = %source.describe(),
        window_size = config.detection.window_size,
        error_rate_threshold = config.detection.error_rate_threshold,
        cooldown_secs = config.alerting.cooldown_secs,
        maintenance_mode = config.alerting.maintenance_mode,
        notifier = if has_notifier { "slack" } else { "stdout" },
        "pool-watcher starting"
    );
    if !has_notifier {
        tracing::warn!("No webhook configured; alerts will be printed to stdout");
    }
}

/// Re-apply command-line overrides to a reloaded config, then swap in its
/// alert settings.
///
/// `running` already carries the overrides, so without this every reload
/// would look like a source change.
pub fn apply_reloaded(
    settings: &SharedSettings,
    running: &WatcherConfig,
    overrides: &ConfigOverrides,
    mut update: WatcherConfig,
) -> UpdateOutcome {
    overrides.apply(&mut update);
    apply_update(settings, running, &update)
}

/// Apply config updates to the shared settings until the channel closes or
/// shutdown fires.
fn spawn_update_applier(
    running: WatcherConfig,
    overrides: ConfigOverrides,
    settings: SharedSettings,
    mut updates: mpsc::UnboundedReceiver<WatcherConfig>,
    shutdown: &Shutdown,
) -> tokio::task::JoinHandle<()> {
    let mut stop = shutdown.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Some(update) => {
                        apply_reloaded(&settings, &running, &overrides, update);
                    }
                    None => break,
                },
                _ = stop.recv() => break,
            }
        }
    })
}

/// Run the watcher until `shutdown` fires or the source ends.
///
/// With `config_path`, the file is watched and SIGHUP reloads it. Reloaded
/// configs get `overrides` applied again before they are compared.
pub async fn run(
    config: WatcherConfig,
    config_path: Option<PathBuf>,
    overrides: ConfigOverrides,
    mut source: Box<dyn LineSource>,
    shutdown: Shutdown,
) -> Result<StopReason, StartupError> {
    // subscribe before checking the flag so a trigger in between is buffered
    let stop = shutdown.subscribe();
    if shutdown.is_triggered() {
        tracing::info!("Shutdown requested before ingestion started");
        source.close().await;
        return Ok(StopReason::Shutdown);
    }

    let notifier = build_notifier(&config.notifier)?;
    log_banner(&config, source.as_ref(), notifier.is_some());

    let (mut pipeline, settings) = build_pipeline(&config, notifier);

    // keeps the file watcher alive for the duration of the run
    let mut _file_watcher = None;
    if let Some(path) = config_path {
        let (watcher, updates) = ConfigWatcher::new(&path);
        spawn_reload_listener(path.clone(), watcher.sender(), &shutdown);
        match watcher.run() {
            Ok(w) => _file_watcher = Some(w),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Config file watch unavailable")
            }
        }
        spawn_update_applier(config.clone(), overrides, settings.clone(), updates, &shutdown);
    }

    let reason = pipeline.run(source.as_mut(), stop).await;
    shutdown.trigger();
    Ok(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceKind;

    #[test]
    fn test_no_webhook_means_no_notifier() {
        let notifier = build_notifier(&NotifierConfig::default()).unwrap();
        assert!(notifier.is_none());
    }

    #[test]
    fn test_webhook_builds_slack_notifier() {
        let config = NotifierConfig {
            webhook_url: Some("https://hooks.slack.com/services/T/B/X".into()),
            timeout_secs: 5,
        };
        let notifier = build_notifier(&config).unwrap().unwrap();
        assert_eq!(notifier.name(), "slack");
    }

    #[test]
    fn test_pipeline_uses_configured_window() {
        let mut config = WatcherConfig::default();
        config.detection.window_size = 75;
        config.alerting.maintenance_mode = true;

        let (pipeline, settings) = build_pipeline(&config, None);
        assert_eq!(pipeline.monitor().window().capacity(), 75);
        assert!(settings.load().maintenance_mode);
        assert!(!pipeline.dispatcher().has_notifier());
    }

    #[test]
    fn test_reload_keeps_cli_source_override() {
        let overrides = ConfigOverrides {
            log_path: Some("/tmp/cli-access.log".into()),
            source_kind: Some(SourceKind::Process),
            log_format: None,
        };
        let mut running = WatcherConfig::default();
        overrides.apply(&mut running);
        let (_pipeline, settings) = build_pipeline(&running, None);

        // a reload starts from file and env only
        let mut reloaded = WatcherConfig::default();
        reloaded.alerting.cooldown_secs = 30;

        let outcome = apply_reloaded(&settings, &running, &overrides, reloaded);
        assert!(outcome.restart_required.is_empty());
        assert!(outcome.settings_changed);
        assert_eq!(settings.load().cooldown_secs, 30);
    }

    #[test]
    fn test_reload_still_reports_real_source_change() {
        let overrides = ConfigOverrides {
            source_kind: Some(SourceKind::Process),
            ..Default::default()
        };
        let mut running = WatcherConfig::default();
        overrides.apply(&mut running);
        let (_pipeline, settings) = build_pipeline(&running, None);

        let mut reloaded = WatcherConfig::default();
        reloaded.source.path = "/var/log/elsewhere.log".into();

        let outcome = apply_reloaded(&settings, &running, &overrides, reloaded);
        assert_eq!(outcome.restart_required, vec!["source"]);
        assert!(!outcome.settings_changed);
    }
}
