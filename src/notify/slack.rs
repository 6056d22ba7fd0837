//! Slack-compatible incoming webhook.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::notify::{Notifier, NotifyError};

#[derive(Debug, Serialize)]
struct SlackPayload<'a> {
    text: &'a str,
}

/// Posts `{"text": ...}` to a webhook URL.
#[derive(Debug, Clone)]
pub struct SlackWebhook {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackWebhook {
    /// Create a webhook channel whose requests give up after `timeout`.
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            webhook_url: webhook_url.into(),
            client,
        })
    }
}

#[async_trait]
impl Notifier for SlackWebhook {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&SlackPayload { text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let json = serde_json::to_value(SlackPayload { text: "Failover: a → b" }).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "Failover: a → b" }));
    }
}
