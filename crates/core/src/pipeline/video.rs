//! Ladder-driven pipeline for videos and GIFs.

use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{ensure_output_dir, file_size};
use crate::domain::{
    build_attempts, validate_output, ValidationIssue, MAX_STICKER_DURATION_SECS,
};
use crate::encoder::{EncodeOptions, Encoder, Prober};
use crate::job::Job;
use crate::metrics;
use crate::task::{TaskError, TaskResult};

/// File-name suffix of produced video stickers.
pub const VIDEO_STICKER_SUFFIX: &str = "_sticker.webm";

/// Probe, ladder, then encode/probe/validate until an attempt passes.
pub struct VideoPipeline<P: Prober, E: Encoder> {
    prober: Arc<P>,
    encoder: Arc<E>,
}

impl<P: Prober, E: Encoder> Clone for VideoPipeline<P, E> {
    fn clone(&self) -> Self {
        Self {
            prober: Arc::clone(&self.prober),
            encoder: Arc::clone(&self.encoder),
        }
    }
}

impl<P: Prober, E: Encoder> VideoPipeline<P, E> {
    pub fn new(prober: Arc<P>, encoder: Arc<E>) -> Self {
        Self { prober, encoder }
    }

    /// Runs jobs in order. Stops after the first cancelled job; the
    /// cancelled job still gets a result, later jobs do not.
    pub async fn run(&self, jobs: &[Job], cancel: &CancellationToken) -> Vec<TaskResult> {
        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            let result = self.run_job(job, cancel).await;
            let stop = result.is_cancelled();
            results.push(result);
            if stop {
                break;
            }
        }
        results
    }

    /// Converts a single job.
    pub async fn run_job(&self, job: &Job, cancel: &CancellationToken) -> TaskResult {
        let input = job.input_path.as_path();
        if cancel.is_cancelled() {
            return TaskResult::failed(input, TaskError::Cancelled);
        }

        info!(input = %input.display(), kind = %job.kind, "Processing video sticker job");

        let info = match self.prober.probe(input, cancel).await {
            Ok(info) => info.with_size_bytes(file_size(input).await),
            Err(e) => {
                warn!(input = %input.display(), error = %e, "Failed to probe source");
                return TaskResult::failed(input, TaskError::from_probe(e));
            }
        };

        let attempts = match build_attempts(&info, job.kind) {
            Ok(attempts) => attempts,
            Err(e) => {
                warn!(input = %input.display(), error = %e, "Cannot build attempt ladder");
                return TaskResult::failed(input, e.into());
            }
        };

        if let Err(e) = ensure_output_dir(job).await {
            return TaskResult::failed(input, e);
        }

        let output = job.output_path(VIDEO_STICKER_SUFFIX);
        let options = EncodeOptions {
            trim_secs: MAX_STICKER_DURATION_SECS,
        };

        let mut last_error: Option<TaskError> = None;
        let mut last_issues: Vec<ValidationIssue> = Vec::new();

        for (index, attempt) in attempts.iter().enumerate() {
            if cancel.is_cancelled() {
                return TaskResult::failed(input, TaskError::Cancelled).with_issues(last_issues);
            }

            debug!(
                input = %input.display(),
                attempt = index + 1,
                of = attempts.len(),
                width = attempt.width,
                height = attempt.height,
                fps = attempt.fps,
                bitrate_kbps = attempt.bitrate_kbps,
                "Encoding attempt"
            );

            if let Err(e) = self
                .encoder
                .encode(input, attempt, &output, options, cancel)
                .await
            {
                if e.is_cancelled() {
                    return TaskResult::failed(input, TaskError::Cancelled)
                        .with_issues(last_issues);
                }
                metrics::ENCODE_ATTEMPTS
                    .with_label_values(&["encode_failed"])
                    .inc();
                warn!(input = %input.display(), attempt = index + 1, error = %e, "Encode attempt failed");
                last_error = Some(TaskError::Encode(e));
                continue;
            }

            match self.check_output(&output, cancel).await {
                Ok(issues) if issues.is_empty() => {
                    metrics::ENCODE_ATTEMPTS.with_label_values(&["accepted"]).inc();
                    info!(
                        input = %input.display(),
                        output = %output.display(),
                        attempt = index + 1,
                        "Sticker accepted"
                    );
                    return TaskResult::succeeded(input, output);
                }
                Ok(issues) => {
                    metrics::ENCODE_ATTEMPTS.with_label_values(&["rejected"]).inc();
                    warn!(
                        input = %input.display(),
                        attempt = index + 1,
                        issues = issues.len(),
                        "Attempt rejected by validation"
                    );
                    last_issues = issues.clone();
                    last_error = Some(TaskError::ValidationFailed(issues));
                }
                Err(TaskError::Cancelled) => {
                    return TaskResult::failed(input, TaskError::Cancelled)
                        .with_issues(last_issues);
                }
                Err(e) => {
                    metrics::ENCODE_ATTEMPTS
                        .with_label_values(&["probe_failed"])
                        .inc();
                    warn!(input = %input.display(), attempt = index + 1, error = %e, "Cannot inspect attempt output");
                    last_error = Some(e);
                }
            }
        }

        metrics::LADDER_EXHAUSTED.inc();
        warn!(
            input = %input.display(),
            attempts = attempts.len(),
            "No attempt satisfied the sticker limits"
        );

        let error = last_error.unwrap_or_else(|| TaskError::ValidationFailed(last_issues.clone()));
        TaskResult::failed(input, error).with_issues(last_issues)
    }

    /// Stats, re-probes and validates a produced artifact.
    async fn check_output(
        &self,
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationIssue>, TaskError> {
        let size_bytes = tokio::fs::metadata(output)
            .await
            .map_err(|source| TaskError::MissingOutput {
                path: output.to_path_buf(),
                source,
            })?
            .len();

        let info = self
            .prober
            .probe(output, cancel)
            .await
            .map_err(TaskError::from_probe)?;

        Ok(validate_output(&info, size_bytes))
    }
}
