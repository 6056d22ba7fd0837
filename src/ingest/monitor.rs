//! Per-source detection state.

use crate::alerting::Alert;
use crate::config::AlertSettings;
use crate::detection::{ErrorRateEvaluator, FailoverDetector, SlidingWindow};
use crate::parser::LogEvent;

/// Window and failover state for one log source.
///
/// Owned by exactly one ingestion loop; independent instances share nothing.
#[derive(Debug, Clone)]
pub struct Monitor {
    window: SlidingWindow,
    failover: FailoverDetector,
}

impl Monitor {
    pub fn new(window_size: usize) -> Self {
        Self {
            window: SlidingWindow::new(window_size),
            failover: FailoverDetector::new(),
        }
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    pub fn last_pool(&self) -> Option<&str> {
        self.failover.last_pool()
    }

    /// Record one event and return the alert conditions it raises,
    /// failover first.
    pub fn observe(&mut self, event: &LogEvent, settings: &AlertSettings) -> Vec<Alert> {
        self.window.push(event.status);

        let mut alerts = Vec::with_capacity(2);
        if let Some(alert) = self.failover.observe(&event.pool, self.window.len()) {
            alerts.push(alert);
        }
        let evaluator = ErrorRateEvaluator::new(settings.error_rate_threshold);
        if let Some(alert) = evaluator.evaluate(&self.window) {
            alerts.push(alert);
        }
        alerts
    }
}
