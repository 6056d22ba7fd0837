//! Outbound notification channels.
//!
//! # Responsibilities
//! - Deliver a rendered alert message to operators
//! - Report delivery success or failure as a `Result`
//!
//! # Design Decisions
//! - One trait, `Notifier`, so the dispatcher can be tested without a network
//! - No retries here; the dispatcher decides what a failure means

pub mod slack;

pub use slack::SlackWebhook;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP request failed (connect, TLS, body).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status.
    #[error("webhook returned status {0}")]
    Status(u16),

    /// Delivery did not complete in time.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// A destination for alert messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short channel name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Deliver `text`.
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}
