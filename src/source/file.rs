//! Polling file follower.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, BufReader};

use crate::source::{read_full_line, wait_for_path, LineSource, SourceError};

/// Follows a file from its end, like `tail -f`.
pub struct FileTail {
    path: PathBuf,
    startup_poll: Duration,
    read_poll: Duration,
    reader: Option<BufReader<File>>,
    pending: Vec<u8>,
}

impl FileTail {
    pub fn new(path: impl AsRef<Path>, startup_poll: Duration, read_poll: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            startup_poll,
            read_poll,
            reader: None,
            pending: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for the file, open it, and seek to the end.
    async fn open_at_end(&mut self) {
        loop {
            wait_for_path(&self.path, self.startup_poll).await;

            match self.try_open().await {
                Ok(reader) => {
                    tracing::info!(path = %self.path.display(), "Following log file");
                    self.reader = Some(reader);
                    self.pending.clear();
                    return;
                }
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Failed to open log file, retrying"
                    );
                    tokio::time::sleep(self.startup_poll).await;
                }
            }
        }
    }

    async fn try_open(&self) -> std::io::Result<BufReader<File>> {
        let mut file = File::open(&self.path).await?;
        file.seek(SeekFrom::End(0)).await?;
        Ok(BufReader::new(file))
    }
}

#[async_trait]
impl LineSource for FileTail {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    async fn start(&mut self) -> Result<(), SourceError> {
        if self.reader.is_none() {
            self.open_at_end().await;
        }
        Ok(())
    }

    async fn next_line(&mut self) -> Result<Option<String>, SourceError> {
        loop {
            let Some(reader) = self.reader.as_mut() else {
                self.open_at_end().await;
                continue;
            };

            match read_full_line(reader, &mut self.pending).await {
                Ok(Some(line)) => return Ok(Some(line)),
                Ok(None) => tokio::time::sleep(self.read_poll).await,
                Err(e) => {
                    // reopen from the end; whatever was buffered is dropped
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Read failed, reopening log file"
                    );
                    self.reader = None;
                    self.pending.clear();
                    tokio::time::sleep(self.startup_poll).await;
                }
            }
        }
    }

    async fn close(&mut self) {
        self.reader = None;
        self.pending.clear();
    }
}
