//! Error types for tasks and the executor.

use std::path::PathBuf;
use thiserror::Error;

use super::types::TaskType;
use crate::domain::{GeometryError, ValidationIssue};
use crate::encoder::EncoderError;

/// Why a task did not produce an accepted artifact.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The source has unusable dimensions.
    #[error(transparent)]
    InvalidGeometry(#[from] GeometryError),

    /// The source or a produced artifact could not be probed.
    #[error("{0}")]
    Probe(#[source] EncoderError),

    /// The encoder failed for an attempt.
    #[error("{0}")]
    Encode(#[source] EncoderError),

    /// The produced artifact broke at least one constraint.
    #[error("validation failed: {}", describe_issues(.0))]
    ValidationFailed(Vec<ValidationIssue>),

    /// The encoder reported success but the artifact is missing.
    #[error("output not found at {}: {source}", path.display())]
    MissingOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory could not be created.
    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The job's input category does not fit the task.
    #[error("unsupported input kind for {task_type}: {}", path.display())]
    UnsupportedInput { path: PathBuf, task_type: TaskType },

    /// No handler is registered for the task type.
    #[error("no handler for task type {0}")]
    NoHandler(TaskType),

    /// The handler panicked.
    #[error("handler failed: {0}")]
    HandlerPanicked(String),

    /// The run was cancelled before the task could finish.
    #[error("cancelled")]
    Cancelled,
}

fn describe_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl TaskError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether the next ladder attempt may still succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Probe(_) | Self::Encode(_) | Self::ValidationFailed(_) | Self::MissingOutput { .. }
        )
    }

    /// Maps an encoder failure, keeping cancellation distinct.
    pub(crate) fn from_encode(err: EncoderError) -> Self {
        if err.is_cancelled() {
            Self::Cancelled
        } else {
            Self::Encode(err)
        }
    }

    /// Maps a probe failure, keeping cancellation distinct.
    pub(crate) fn from_probe(err: EncoderError) -> Self {
        if err.is_cancelled() {
            Self::Cancelled
        } else {
            Self::Probe(err)
        }
    }
}

/// Errors returned by [`TaskExecutor::run`](super::TaskExecutor::run).
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The arguments cannot be used, e.g. the event receiver is already gone.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The run was cancelled; tasks not yet started were dropped.
    #[error("run cancelled")]
    Cancelled,
}
