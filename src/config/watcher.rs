//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_layered;
use crate::config::schema::{AlertSettings, WatcherConfig};

/// Alert settings shared between the reload path and the ingestion loop.
pub type SharedSettings = Arc<ArcSwap<AlertSettings>>;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<WatcherConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<WatcherConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// A sender that injects reloads from elsewhere (SIGHUP).
    pub fn sender(&self) -> mpsc::UnboundedSender<WatcherConfig> {
        self.update_tx.clone()
    }

    /// Start watching the file in a background thread.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, reloading...");
                        reload_into(&path, &tx);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Load `path` (plus environment overrides) and forward it on success.
pub fn reload_into(path: &Path, tx: &mpsc::UnboundedSender<WatcherConfig>) {
    match load_layered(Some(path)) {
        Ok(new_config) => {
            let _ = tx.send(new_config);
        }
        Err(e) => {
            tracing::error!(
                "Failed to reload config: {}. Keeping current configuration.",
                e
            );
        }
    }
}

/// What a reload changed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// New alert settings were swapped in.
    pub settings_changed: bool,
    /// Fields that differ but only take effect after a restart.
    pub restart_required: Vec<&'static str>,
}

/// Swap in the reloadable part of `update`.
///
/// Window capacity and source selection are fixed for the process lifetime;
/// changes to them are reported and ignored.
pub fn apply_update(
    settings: &SharedSettings,
    running: &WatcherConfig,
    update: &WatcherConfig,
) -> UpdateOutcome {
    let mut outcome = UpdateOutcome::default();

    if update.detection.window_size != running.detection.window_size {
        tracing::warn!(
            running = running.detection.window_size,
            requested = update.detection.window_size,
            "window_size cannot change at runtime; restart to apply"
        );
        outcome.restart_required.push("window_size");
    }
    if update.source != running.source {
        tracing::warn!("source settings cannot change at runtime; restart to apply");
        outcome.restart_required.push("source");
    }

    let next = update.alert_settings();
    if **settings.load() == next {
        tracing::debug!("Reloaded config has no alert setting changes");
        return outcome;
    }

    tracing::info!(
        error_rate_threshold = next.error_rate_threshold,
        cooldown_secs = next.cooldown_secs,
        maintenance_mode = next.maintenance_mode,
        "Alert settings updated"
    );
    settings.store(Arc::new(next));
    outcome.settings_changed = true;
    outcome
}
