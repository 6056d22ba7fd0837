//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use arc_swap::ArcSwap;
use async_trait::async_trait;

use pool_watcher::alerting::AlertDispatcher;
use pool_watcher::config::{AlertSettings, SharedSettings};
use pool_watcher::ingest::{Monitor, Pipeline};
use pool_watcher::notify::{Notifier, NotifyError};
use pool_watcher::parser::RegexLineParser;

/// An nginx access log line in the format the proxy writes.
pub fn access_line(pool: &str, upstream_status: &str) -> String {
    format!(
        concat!(
            r#"172.18.0.1 - - [16/Oct/2026:10:00:00 +0000] "GET /version HTTP/1.1" 200 57 "#,
            r#""-" "curl/8.0" pool="{}" release="v1.0.0" upstream_status="{}" "#,
            r#"upstream_addr="172.18.0.3:3000" request_time=0.004"#,
        ),
        pool, upstream_status
    )
}

/// Notifier that records every message it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

pub fn shared_settings(
    threshold: f64,
    cooldown_secs: u64,
    maintenance_mode: bool,
) -> SharedSettings {
    Arc::new(ArcSwap::from_pointee(AlertSettings {
        error_rate_threshold: threshold,
        cooldown_secs,
        maintenance_mode,
    }))
}

/// A pipeline with the default parser delivering to `notifier`.
pub fn pipeline_with(
    notifier: Arc<RecordingNotifier>,
    window_size: usize,
    settings: SharedSettings,
) -> Pipeline {
    let dispatcher = AlertDispatcher::new(
        Some(notifier as Arc<dyn Notifier>),
        settings.clone(),
        Duration::from_secs(5),
    );
    Pipeline::new(
        Box::new(RegexLineParser::new()),
        Monitor::new(window_size),
        dispatcher,
        settings,
    )
}
