//! Prometheus metrics for the transcoding core.
//!
//! This module provides metrics for:
//! - Executor (tasks by type and result, task duration)
//! - Pipelines (encode attempts by outcome, exhausted ladders)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Executor Metrics
// =============================================================================

/// Tasks finished total by task type and result.
pub static TASKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("stickerfit_tasks_total", "Total tasks finished"),
        &["task_type", "result"], // result: "success", "failed", "cancelled"
    )
    .unwrap()
});

/// Wall-clock time per task in seconds.
pub static TASK_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("stickerfit_task_duration_seconds", "Duration of tasks")
            .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 180.0]),
        &["task_type"],
    )
    .unwrap()
});

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Encode attempts total by outcome.
pub static ENCODE_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("stickerfit_encode_attempts_total", "Total encode attempts"),
        &["outcome"], // "accepted", "rejected", "encode_failed", "probe_failed"
    )
    .unwrap()
});

/// Jobs whose whole attempt ladder failed.
pub static LADDER_EXHAUSTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "stickerfit_ladder_exhausted_total",
        "Total jobs where no attempt passed validation",
    )
    .unwrap()
});

/// Returns all metrics for registration with a Prometheus registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Executor
        Box::new(TASKS_TOTAL.clone()),
        Box::new(TASK_DURATION.clone()),
        // Pipeline
        Box::new(ENCODE_ATTEMPTS.clone()),
        Box::new(LADDER_EXHAUSTED.clone()),
    ]
}
