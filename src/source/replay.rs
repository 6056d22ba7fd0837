//! One-shot reader over an existing file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::BufReader;

use crate::source::{read_full_line, take_line, LineSource, SourceError};

/// Reads a file from the beginning and stops at EOF.
pub struct ReplaySource {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    pending: Vec<u8>,
    done: bool,
}

impl ReplaySource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            reader: None,
            pending: Vec::new(),
            done: false,
        }
    }

    fn io_error(&self, source: std::io::Error) -> SourceError {
        SourceError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl LineSource for ReplaySource {
    fn describe(&self) -> String {
        format!("replay:{}", self.path.display())
    }

    async fn start(&mut self) -> Result<(), SourceError> {
        let file = File::open(&self.path).await.map_err(|e| self.io_error(e))?;
        self.reader = Some(BufReader::new(file));
        Ok(())
    }

    async fn next_line(&mut self) -> Result<Option<String>, SourceError> {
        if self.done {
            return Ok(None);
        }
        if self.reader.is_none() {
            self.start().await?;
        }
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        match read_full_line(reader, &mut self.pending).await {
            Ok(Some(line)) => Ok(Some(line)),
            Ok(None) => {
                self.done = true;
                self.reader = None;
                if self.pending.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(take_line(&mut self.pending)))
                }
            }
            Err(e) => {
                self.done = true;
                self.reader = None;
                Err(self.io_error(e))
            }
        }
    }

    async fn close(&mut self) {
        self.reader = None;
    }
}
