//! Alert dispatch with maintenance and cooldown suppression.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::alerting::cooldown::CooldownTracker;
use crate::alerting::{Alert, AlertKind};
use crate::config::SharedSettings;
use crate::notify::{Notifier, NotifyError};
use crate::observability::metrics;
use crate::resilience::timeouts::with_timeout;

/// Why an alert was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// Failover alerts are muted during maintenance.
    Maintenance,
    /// Same kind fired recently.
    Cooldown { remaining: Duration },
}

/// Result of handing one alert to the dispatcher.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Delivered through the notifier.
    Sent,
    /// No notifier configured; printed locally.
    Logged,
    /// Not delivered by policy.
    Suppressed(SuppressReason),
    /// Notifier failed; cooldown untouched.
    Failed(NotifyError),
}

impl DispatchOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            DispatchOutcome::Sent => "sent",
            DispatchOutcome::Logged => "logged",
            DispatchOutcome::Suppressed(SuppressReason::Maintenance) => "maintenance",
            DispatchOutcome::Suppressed(SuppressReason::Cooldown { .. }) => "cooldown",
            DispatchOutcome::Failed(_) => "failed",
        }
    }

    /// True when the alert reached an operator (webhook or stdout).
    pub fn delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Sent | DispatchOutcome::Logged)
    }
}

/// Applies suppression rules and delivers alerts.
pub struct AlertDispatcher {
    notifier: Option<Arc<dyn Notifier>>,
    settings: SharedSettings,
    cooldown: CooldownTracker,
    send_timeout: Duration,
}

impl AlertDispatcher {
    pub fn new(
        notifier: Option<Arc<dyn Notifier>>,
        settings: SharedSettings,
        send_timeout: Duration,
    ) -> Self {
        Self {
            notifier,
            settings,
            cooldown: CooldownTracker::new(),
            send_timeout,
        }
    }

    pub fn has_notifier(&self) -> bool {
        self.notifier.is_some()
    }

    pub fn cooldown(&self) -> &CooldownTracker {
        &self.cooldown
    }

    /// Deliver `alert` unless maintenance or cooldown suppresses it.
    ///
    /// Never fails: notifier errors are logged and returned as
    /// [`DispatchOutcome::Failed`].
    pub async fn dispatch(&mut self, alert: &Alert, now: Instant) -> DispatchOutcome {
        let outcome = self.dispatch_inner(alert, now).await;
        metrics::record_alert(alert.kind(), outcome.label());
        outcome
    }

    async fn dispatch_inner(&mut self, alert: &Alert, now: Instant) -> DispatchOutcome {
        let kind = alert.kind();
        let settings = self.settings.load_full();

        if kind == AlertKind::Failover && settings.maintenance_mode {
            tracing::debug!(kind = %kind, "Failover alert muted by maintenance mode");
            return DispatchOutcome::Suppressed(SuppressReason::Maintenance);
        }

        if let Some(remaining) = self.cooldown.remaining(kind, settings.cooldown(), now) {
            tracing::debug!(
                kind = %kind,
                remaining_secs = remaining.as_secs(),
                "Alert suppressed by cooldown"
            );
            return DispatchOutcome::Suppressed(SuppressReason::Cooldown { remaining });
        }

        let message = alert.message();

        let Some(notifier) = &self.notifier else {
            println!("[ALERT] {}", message);
            tracing::warn!(
                kind = %kind,
                message = %message,
                "Alert raised (no notifier configured)"
            );
            self.cooldown.record(kind, now);
            return DispatchOutcome::Logged;
        };

        let result = match with_timeout(self.send_timeout, notifier.send(&message)).await {
            Ok(result) => result,
            Err(elapsed) => Err(NotifyError::Timeout(elapsed.0)),
        };

        match result {
            Ok(()) => {
                tracing::info!(kind = %kind, channel = notifier.name(), "Sent {} alert", kind);
                self.cooldown.record(kind, now);
                DispatchOutcome::Sent
            }
            Err(e) => {
                tracing::error!(
                    kind = %kind,
                    channel = notifier.name(),
                    error = %e,
                    "Failed to send alert"
                );
                DispatchOutcome::Failed(e)
            }
        }
    }
}
