//! The ingestion loop.

use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use crate::alerting::{Alert, AlertDispatcher, DispatchOutcome};
use crate::config::SharedSettings;
use crate::ingest::monitor::Monitor;
use crate::observability::metrics;
use crate::parser::{LineParser, LogEvent};
use crate::source::LineSource;

/// Pause after a source error before asking for the next line.
const SOURCE_ERROR_PAUSE: Duration = Duration::from_secs(1);

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub lines: u64,
    pub events: u64,
    pub alerts_raised: u64,
    pub alerts_delivered: u64,
}

/// Why the loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Shutdown,
    SourceExhausted,
    /// The source could not be started (missing replay file, bad command).
    SourceFailed,
}

/// Drives parser → monitor → dispatcher for one line source.
pub struct Pipeline {
    parser: Box<dyn LineParser>,
    monitor: Monitor,
    dispatcher: AlertDispatcher,
    settings: SharedSettings,
    stats: PipelineStats,
}

impl Pipeline {
    pub fn new(
        parser: Box<dyn LineParser>,
        monitor: Monitor,
        dispatcher: AlertDispatcher,
        settings: SharedSettings,
    ) -> Self {
        Self {
            parser,
            monitor,
            dispatcher,
            settings,
            stats: PipelineStats::default(),
        }
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn dispatcher(&self) -> &AlertDispatcher {
        &self.dispatcher
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Feed one raw line through the pipeline.
    ///
    /// Returns the outcome of every alert the line raised. Lines that do not
    /// match the parser leave all state untouched.
    pub async fn process_line(
        &mut self,
        line: &str,
        now: Instant,
    ) -> Vec<(Alert, DispatchOutcome)> {
        self.stats.lines += 1;
        metrics::record_line();

        let Some(event) = self.parser.parse(line) else {
            return Vec::new();
        };
        self.process_event(&event, now).await
    }

    /// Feed one already parsed event through detection and dispatch.
    pub async fn process_event(
        &mut self,
        event: &LogEvent,
        now: Instant,
    ) -> Vec<(Alert, DispatchOutcome)> {
        self.stats.events += 1;
        metrics::record_event();

        let settings = self.settings.load_full();
        let alerts = self.monitor.observe(event, &settings);

        let window = self.monitor.window();
        metrics::record_window(
            window.len(),
            crate::detection::ErrorRateEvaluator::error_rate(window),
        );

        let mut outcomes = Vec::with_capacity(alerts.len());
        for alert in alerts {
            self.stats.alerts_raised += 1;
            let outcome = self.dispatcher.dispatch(&alert, now).await;
            if outcome.delivered() {
                self.stats.alerts_delivered += 1;
            }
            outcomes.push((alert, outcome));
        }
        outcomes
    }

    /// Consume `source` until it is exhausted or shutdown is signalled.
    ///
    /// The source is always closed before returning. An in-flight alert send
    /// is abandoned on shutdown.
    pub async fn run(
        &mut self,
        source: &mut dyn LineSource,
        mut shutdown: broadcast::Receiver<()>,
    ) -> StopReason {
        let description = source.describe();
        tracing::info!(source = %description, "Ingestion starting");

        let reason = tokio::select! {
            reason = self.consume(source) => reason,
            _ = shutdown.recv() => {
                tracing::info!("Ingestion received shutdown signal, exiting loop");
                StopReason::Shutdown
            }
        };

        source.close().await;
        tracing::info!(
            source = %description,
            lines = self.stats.lines,
            events = self.stats.events,
            alerts_raised = self.stats.alerts_raised,
            alerts_delivered = self.stats.alerts_delivered,
            ?reason,
            "Ingestion stopped"
        );
        reason
    }

    async fn consume(&mut self, source: &mut dyn LineSource) -> StopReason {
        if let Err(e) = source.start().await {
            tracing::error!(error = %e, "Log source failed to start");
            return StopReason::SourceFailed;
        }

        loop {
            match source.next_line().await {
                Ok(Some(line)) => {
                    self.process_line(&line, Instant::now()).await;
                }
                Ok(None) => return StopReason::SourceExhausted,
                Err(e) => {
                    tracing::error!(error = %e, "Log source error");
                    tokio::time::sleep(SOURCE_ERROR_PAUSE).await;
                }
            }
        }
    }
}
