//! In-process line source backed by an mpsc channel.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::source::{LineSource, SourceError};

/// Lines pushed by another task. Ends when every sender is dropped.
pub struct ChannelSource {
    rx: mpsc::Receiver<String>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<String>) -> Self {
        Self { rx }
    }

    /// Create a source and the sender that feeds it.
    pub fn pair(buffer: usize) -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl LineSource for ChannelSource {
    fn describe(&self) -> String {
        "channel".to_string()
    }

    async fn next_line(&mut self) -> Result<Option<String>, SourceError> {
        Ok(self.rx.recv().await)
    }

    async fn close(&mut self) {
        self.rx.close();
    }
}
