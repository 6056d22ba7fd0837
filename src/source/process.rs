//! External follower process (`tail -F`) reader.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::BufReader;
use tokio::process::{Child, ChildStdout, Command};

use crate::config::SourceConfig;
use crate::resilience::backoff::RestartBackoff;
use crate::source::{read_full_line, wait_for_path, LineSource, SourceError};

/// Reads lines from the stdout of a long-running follower command.
///
/// The child is respawned with backoff whenever it exits and is killed when
/// the source is closed or dropped.
pub struct ProcessTail {
    program: String,
    args: Vec<String>,
    path: PathBuf,
    startup_poll: Duration,
    backoff: RestartBackoff,
    child: Option<Child>,
    stdout: Option<BufReader<ChildStdout>>,
    pending: Vec<u8>,
}

impl ProcessTail {
    /// `command[0]` is the program; `{path}` in any argument is replaced with
    /// the log path.
    pub fn new(
        command: &[String],
        path: impl Into<PathBuf>,
        startup_poll: Duration,
        backoff: RestartBackoff,
    ) -> Self {
        let path = path.into();
        let path_str = path.display().to_string();
        let mut parts = command.iter().map(|part| part.replace("{path}", &path_str));
        let program = parts.next().unwrap_or_else(|| "tail".to_string());

        Self {
            program,
            args: parts.collect(),
            path,
            startup_poll,
            backoff,
            child: None,
            stdout: None,
            pending: Vec::new(),
        }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(
            &config.command,
            &config.path,
            Duration::from_millis(config.startup_poll_ms),
            RestartBackoff::new(config.restart_base_ms, config.restart_max_ms),
        )
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn spawn(&mut self) -> Result<(), SourceError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SourceError::Spawn {
                command: self.command_line(),
                source,
            })?;

        self.stdout = child.stdout.take().map(BufReader::new);
        self.child = Some(child);
        self.pending.clear();
        tracing::info!(command = %self.command_line(), "Follower process started");
        Ok(())
    }

    async fn reap(&mut self) {
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.start_kill();
            match child.wait().await {
                Ok(status) => tracing::warn!(%status, "Follower process exited"),
                Err(e) => tracing::warn!(error = %e, "Failed to reap follower process"),
            }
        }
    }
}

#[async_trait]
impl LineSource for ProcessTail {
    fn describe(&self) -> String {
        format!("process:{}", self.command_line())
    }

    async fn start(&mut self) -> Result<(), SourceError> {
        wait_for_path(&self.path, self.startup_poll).await;
        if self.child.is_none() {
            self.spawn()?;
        }
        Ok(())
    }

    async fn next_line(&mut self) -> Result<Option<String>, SourceError> {
        loop {
            let Some(stdout) = self.stdout.as_mut() else {
                if let Err(e) = self.spawn() {
                    let delay = self.backoff.next_delay();
                    tracing::error!(
                        error = %e,
                        retry_in_ms = delay.as_millis() as u64,
                        "Cannot start follower"
                    );
                    tokio::time::sleep(delay).await;
                }
                continue;
            };

            match read_full_line(stdout, &mut self.pending).await {
                Ok(Some(line)) => {
                    self.backoff.reset();
                    return Ok(Some(line));
                }
                // EOF on a pipe means the child is gone
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Read from follower failed"),
            }

            self.reap().await;
            let delay = self.backoff.next_delay();
            tracing::info!(retry_in_ms = delay.as_millis() as u64, "Restarting follower process");
            tokio::time::sleep(delay).await;
        }
    }

    async fn close(&mut self) {
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill().await;
        }
    }
}
