//! Log line sources.
//!
//! # Variants
//! - `file.rs`: poll the access log directly (tail-from-end)
//! - `process.rs`: read the stdout of an external follower (`tail -F`)
//! - `replay.rs`: read an existing file once from the beginning
//! - `channel.rs`: lines pushed in-process over an mpsc channel
//!
//! # Design Decisions
//! - The ingestion loop only sees the `LineSource` trait
//! - Followers never replay content that existed before they started
//! - A missing log file at startup is a wait state, not an error

pub mod channel;
pub mod file;
pub mod process;
pub mod replay;

pub use channel::ChannelSource;
pub use file::FileTail;
pub use process::ProcessTail;
pub use replay::ReplaySource;

use std::io;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::config::{SourceConfig, SourceKind};

/// Errors surfaced by a line source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn follower '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// A sequence of log lines, oldest first.
#[async_trait]
pub trait LineSource: Send {
    /// Human-readable description for logs.
    fn describe(&self) -> String;

    /// Wait until the underlying log is available and position at its end.
    async fn start(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Next complete line without its terminator. `None` means the source
    /// is exhausted and will not produce more lines.
    async fn next_line(&mut self) -> Result<Option<String>, SourceError>;

    /// Release handles (files, child processes).
    async fn close(&mut self) {}
}

/// Build the configured follower.
pub fn from_config(config: &SourceConfig) -> Box<dyn LineSource> {
    match config.kind {
        SourceKind::File => Box::new(FileTail::new(
            &config.path,
            Duration::from_millis(config.startup_poll_ms),
            Duration::from_millis(config.read_poll_ms),
        )),
        SourceKind::Process => Box::new(ProcessTail::from_config(config)),
    }
}

/// Poll until `path` exists.
pub(crate) async fn wait_for_path(path: &Path, interval: Duration) {
    let mut logged = false;
    while !tokio::fs::try_exists(path).await.unwrap_or(false) {
        if !logged {
            tracing::info!(path = %path.display(), "Waiting for log file to appear");
            logged = true;
        }
        tokio::time::sleep(interval).await;
    }
}

/// Append bytes up to and including the next `\n` to `buf`.
///
/// Returns `Some(line)` once a full line is buffered; `None` at EOF with the
/// partial data kept in `buf`.
pub(crate) async fn read_full_line<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    reader.read_until(b'\n', buf).await?;
    if buf.last() == Some(&b'\n') {
        Ok(Some(take_line(buf)))
    } else {
        Ok(None)
    }
}

/// Drain `buf` into a string, dropping the line terminator.
pub(crate) fn take_line(buf: &mut Vec<u8>) -> String {
    let mut line = String::from_utf8_lossy(buf).into_owned();
    buf.clear();
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    line
}
