mod args;
mod metrics;
mod report;

use std::io;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use sha2::{Digest, Sha256};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stickerfit_core::{
    build_tasks, default_handlers, evaluate_target, filter_jobs_for_target, load_config,
    load_default_config, validate_config, Config, ExecutorError, FfmpegEncoder,
    ImageHeaderProber, InputSummary, SelectionExpander, SelectionItem, TargetStatus,
    TaskExecutor,
};

use args::Cli;
use report::{Reporter, RunReport};

/// Buffer size for the executor event channel
const EVENT_BUFFER_SIZE: usize = 64;

const EXIT_OK: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            std::process::exit(EXIT_FAILURE);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let config = load(&cli)?;

    // Compute config hash so runs can be correlated with their settings
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        config_hash = &config_hash[..16],
        concurrency = config.executor.concurrency,
        output = %config.output.dir.display(),
        "Configuration loaded"
    );

    let encoder = FfmpegEncoder::new(config.encoder.clone());
    encoder
        .validate()
        .await
        .context("ffmpeg and ffprobe must be installed")?;

    let selections = cli
        .inputs
        .iter()
        .map(SelectionItem::from_path)
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to read selection")?;
    let expanded = SelectionExpander::new()
        .expand(&selections, &config.output.dir)
        .context("Failed to expand selection")?;
    for skipped in &expanded.skipped {
        warn!(path = %skipped.path.display(), reason = %skipped.reason, "Skipping input");
    }
    info!(
        files = expanded.file_count,
        dirs = expanded.dir_count,
        total = expanded.total_files,
        "Selection expanded"
    );

    let target = cli.target;
    let hint = evaluate_target(&InputSummary::from_jobs(&expanded.jobs), target);
    match hint.status {
        TargetStatus::Blocked => bail!("{}: {}", target.label(), hint.message),
        TargetStatus::Warning => warn!("{}", hint.message),
        TargetStatus::Ok => {}
    }

    let jobs = filter_jobs_for_target(expanded.jobs, target);
    let tasks = build_tasks(jobs, target.task_type());
    let total = tasks.len();

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let media = Arc::new(encoder);
    let executor = TaskExecutor::new(
        config.executor.clone(),
        default_handlers(media, Arc::new(ImageHeaderProber::new())),
    );

    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER_SIZE);
    let report = if cli.json {
        let reporter = Reporter::new(io::stderr(), total);
        let printer = tokio::spawn(report::drain(events_rx, reporter));
        let cancelled = execute(&executor, tasks, events_tx, cancel).await?;
        let report = printer.await??.finish(target, cancelled)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        report
    } else {
        let reporter = Reporter::new(io::stdout(), total);
        let printer = tokio::spawn(report::drain(events_rx, reporter));
        let cancelled = execute(&executor, tasks, events_tx, cancel).await?;
        printer.await??.finish(target, cancelled)?
    };

    if cli.print_metrics {
        print!("{}", metrics::encode_metrics());
    }

    Ok(exit_code(&report))
}

/// Loads the config file (or defaults) and applies command-line overrides.
fn load(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => load_default_config().context("Failed to load default config")?,
    };

    if let Some(concurrency) = cli.concurrency {
        config.executor.concurrency = concurrency;
    }
    if let Some(dir) = &cli.output {
        config.output.dir = dir.clone();
    }

    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

/// Runs the executor. Returns whether the run was cancelled.
async fn execute(
    executor: &TaskExecutor,
    tasks: Vec<stickerfit_core::Task>,
    events: mpsc::Sender<stickerfit_core::TaskEvent>,
    cancel: CancellationToken,
) -> Result<bool> {
    match executor.run(tasks, events, cancel).await {
        Ok(()) => Ok(false),
        Err(ExecutorError::Cancelled) => {
            warn!("Run cancelled; queued tasks were not started");
            Ok(true)
        }
        Err(e) => Err(e).context("Task run failed"),
    }
}

fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling run");
            cancel.cancel();
        }
    });
}

fn exit_code(report: &RunReport) -> i32 {
    if report.cancelled {
        EXIT_CANCELLED
    } else if report.summary.failed > 0 {
        EXIT_FAILURE
    } else {
        EXIT_OK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use report::RunSummary;
    use stickerfit_core::TargetType;

    fn report(failed: usize, cancelled: bool) -> RunReport {
        RunReport {
            target: TargetType::VideoSticker,
            cancelled,
            summary: RunSummary {
                total: 2,
                succeeded: 2 - failed,
                failed,
            },
            tasks: Vec::new(),
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&report(0, false)), EXIT_OK);
        assert_eq!(exit_code(&report(1, false)), EXIT_FAILURE);
        assert_eq!(exit_code(&report(1, true)), EXIT_CANCELLED);
    }

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::parse_from(["stickerfit", "a.mp4", "-j", "2", "-o", "stickers"]);
        let config = load(&cli).unwrap();
        assert_eq!(config.executor.concurrency, 2);
        assert_eq!(config.output.dir, std::path::PathBuf::from("stickers"));
    }

    #[test]
    fn test_missing_config_file_is_fatal() {
        let cli = Cli::parse_from(["stickerfit", "a.mp4", "--config", "/nonexistent/stickerfit.toml"]);
        assert!(load(&cli).is_err());
    }
}
