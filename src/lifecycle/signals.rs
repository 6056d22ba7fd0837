//! OS signal handling.
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGTERM/SIGINT trigger graceful shutdown
//! - SIGHUP triggers config reload, not shutdown

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::config::watcher::reload_into;
use crate::config::WatcherConfig;
use crate::lifecycle::Shutdown;

/// Resolve when SIGINT (Ctrl-C) or SIGTERM arrives.
pub async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

/// Trigger `shutdown` on the first interrupt.
pub fn spawn_shutdown_listener(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        shutdown.trigger();
    })
}

/// Reload `path` on every SIGHUP until shutdown.
#[cfg(unix)]
pub fn spawn_reload_listener(
    path: PathBuf,
    updates: mpsc::UnboundedSender<WatcherConfig>,
    shutdown: &Shutdown,
) -> Option<tokio::task::JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(sig) => sig,
        Err(e) => {
            tracing::warn!(error = %e, "SIGHUP reload unavailable");
            return None;
        }
    };
    let mut stop = shutdown.subscribe();

    Some(tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = hangup.recv() => {
                    tracing::info!(
                        path = %path.display(),
                        "Received SIGHUP, reloading configuration"
                    );
                    reload_into(&path, &updates);
                }
                _ = stop.recv() => break,
            }
        }
    }))
}

#[cfg(not(unix))]
pub fn spawn_reload_listener(
    _path: PathBuf,
    _updates: mpsc::UnboundedSender<WatcherConfig>,
    _shutdown: &Shutdown,
) -> Option<tokio::task::JoinHandle<()>> {
    None
}
