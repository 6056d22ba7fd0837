//! Metrics collection and exposition.
//!
//! # Metrics
//! - `watcher_lines_total` (counter): lines read from the log source
//! - `watcher_events_total` (counter): lines that parsed into events
//! - `watcher_alerts_total` (counter): alerts by `kind` and `outcome`
//! - `watcher_window_len` (gauge): current window size
//! - `watcher_error_rate_percent` (gauge): last computed error rate
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exporter is opt-in

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::alerting::AlertKind;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_line() {
    metrics::counter!("watcher_lines_total").increment(1);
}

pub fn record_event() {
    metrics::counter!("watcher_events_total").increment(1);
}

pub fn record_window(len: usize, error_rate: Option<f64>) {
    metrics::gauge!("watcher_window_len").set(len as f64);
    if let Some(rate) = error_rate {
        metrics::gauge!("watcher_error_rate_percent").set(rate);
    }
}

pub fn record_alert(kind: AlertKind, outcome: &'static str) {
    metrics::counter!("watcher_alerts_total", "kind" => kind.as_str(), "outcome" => outcome)
        .increment(1);
}
