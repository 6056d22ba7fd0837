//! Failover edge detection on the upstream pool label.

use crate::alerting::Alert;

/// Remembers the last non-empty pool and reports transitions.
#[derive(Debug, Clone, Default)]
pub struct FailoverDetector {
    last_pool: Option<String>,
}

impl FailoverDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_pool(&self) -> Option<&str> {
        self.last_pool.as_deref()
    }

    /// Observe the pool of one request.
    ///
    /// Empty pools are ignored. The first non-empty pool becomes the
    /// baseline without an alert.
    pub fn observe(&mut self, pool: &str, window_len: usize) -> Option<Alert> {
        if pool.is_empty() {
            return None;
        }

        match self.last_pool.as_deref() {
            None => {
                tracing::debug!(pool, "Baseline pool observed");
                self.last_pool = Some(pool.to_string());
                None
            }
            Some(last) if last == pool => None,
            Some(last) => {
                let alert = Alert::Failover {
                    from: last.to_string(),
                    to: pool.to_string(),
                    window_len,
                };
                self.last_pool = Some(pool.to_string());
                Some(alert)
            }
        }
    }
}
