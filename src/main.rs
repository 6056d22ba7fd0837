//! pool-watcher
//!
//! Watches a reverse-proxy access log for upstream pool failover and
//! elevated 5xx rates.
//!
//! # Architecture Overview
//!
//! ```text
//!   access.log ──▶ source ──▶ parser ──▶ window ──┬──▶ failover  ──┐
//!   (tail)         file/      pool +     last N   │    detector    │
//!                  process    status     statuses └──▶ error-rate ─┤
//!                                                      evaluator   │
//!                                                                  ▼
//!                               Slack webhook / stdout ◀── dispatcher
//!                                                       (maintenance,
//!                                                        cooldown)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use pool_watcher::config::loader::load_layered;
use pool_watcher::config::{ConfigOverrides, LogFormat, SourceKind};
use pool_watcher::ingest::StopReason;
use pool_watcher::lifecycle::{signals, startup, Shutdown};
use pool_watcher::observability::{logging, metrics};
use pool_watcher::source::{self, LineSource, ReplaySource};

#[derive(Parser)]
#[command(name = "pool-watcher")]
#[command(
    about = "Alert on upstream pool failover and error rate from a proxy access log",
    long_about = None
)]
struct Cli {
    /// TOML config file (also watched for changes).
    #[arg(short, long, env = "WATCHER_CONFIG")]
    config: Option<PathBuf>,

    /// Access log path, overrides config and LOG_PATH.
    #[arg(long)]
    log_path: Option<String>,

    /// Follower variant.
    #[arg(long)]
    source: Option<SourceKind>,

    /// Emit JSON logs.
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow the log and alert (default)
    Run,
    /// Run the detection pipeline once over an existing log file
    Replay {
        /// Log file to read from the beginning
        path: PathBuf,
    },
    /// Validate configuration and print the effective settings
    CheckConfig,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            log_path: self.log_path.clone(),
            source_kind: self.source,
            log_format: self.json_logs.then_some(LogFormat::Json),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match load_layered(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("pool-watcher: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let overrides = cli.overrides();
    overrides.apply(&mut config);

    if let Some(Commands::CheckConfig) = cli.command {
        return match toml::to_string_pretty(&config) {
            Ok(rendered) => {
                println!("{}", rendered);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("pool-watcher: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    logging::init_logging(&config.observability);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    signals::spawn_shutdown_listener(shutdown.clone());

    let (line_source, config_path): (Box<dyn LineSource>, Option<PathBuf>) = match cli.command {
        Some(Commands::Replay { path }) => {
            (Box::new(ReplaySource::new(path)) as Box<dyn LineSource>, None)
        }
        _ => (source::from_config(&config.source), cli.config.clone()),
    };

    match startup::run(config, config_path, overrides, line_source, shutdown).await {
        Ok(StopReason::SourceFailed) => ExitCode::FAILURE,
        Ok(reason) => {
            tracing::info!(?reason, "Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            ExitCode::FAILURE
        }
    }
}
