//! Task, result and event types shared by the executor and the pipelines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::error::TaskError;
use crate::domain::ValidationIssue;
use crate::job::Job;

/// What a task produces. Selects the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    VideoSticker,
    StaticSticker,
    Emoji,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [Self::VideoSticker, Self::StaticSticker, Self::Emoji];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VideoSticker => "video_sticker",
            Self::StaticSticker => "static_sticker",
            Self::Emoji => "emoji",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work for the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Position in the submitted task list.
    pub id: usize,
    pub task_type: TaskType,
    /// Display label, usually the input path.
    pub label: String,
    pub job: Job,
}

/// Terminal outcome of one task.
#[derive(Debug, Default)]
pub struct TaskResult {
    pub input_path: PathBuf,
    /// Produced artifact, absent on failure.
    pub output_path: Option<PathBuf>,
    /// Last error, absent on success.
    pub error: Option<TaskError>,
    /// Issues of the last rejected artifact.
    pub issues: Vec<ValidationIssue>,
}

impl TaskResult {
    pub fn succeeded(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: Some(output_path.into()),
            ..Default::default()
        }
    }

    pub fn failed(input_path: impl Into<PathBuf>, error: TaskError) -> Self {
        Self {
            input_path: input_path.into(),
            error: Some(error),
            ..Default::default()
        }
    }

    pub fn with_issues(mut self, issues: Vec<ValidationIssue>) -> Self {
        self.issues = issues;
        self
    }

    /// No error and no outstanding issues.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.issues.is_empty()
    }

    pub fn is_cancelled(&self) -> bool {
        self.error.as_ref().is_some_and(TaskError::is_cancelled)
    }

    /// One-line failure description: the error, else the first issue.
    pub fn failure_message(&self) -> Option<String> {
        if let Some(error) = &self.error {
            return Some(error.to_string());
        }
        self.issues.first().map(|issue| issue.message.clone())
    }
}

/// Lifecycle stage reported by a [`TaskEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskEventKind {
    Started,
    Finished,
}

/// Progress notification emitted by the executor.
#[derive(Debug)]
pub struct TaskEvent {
    pub kind: TaskEventKind,
    pub task: Task,
    /// Present on `Finished` only.
    pub result: Option<TaskResult>,
    pub timestamp: DateTime<Utc>,
}

impl TaskEvent {
    pub fn started(task: Task) -> Self {
        Self {
            kind: TaskEventKind::Started,
            task,
            result: None,
            timestamp: Utc::now(),
        }
    }

    pub fn finished(task: Task, result: TaskResult) -> Self {
        Self {
            kind: TaskEventKind::Finished,
            task,
            result: Some(result),
            timestamp: Utc::now(),
        }
    }
}

/// Builds one task per job; ids follow job order.
pub fn build_tasks(jobs: Vec<Job>, task_type: TaskType) -> Vec<Task> {
    jobs.into_iter()
        .enumerate()
        .map(|(id, job)| Task {
            id,
            task_type,
            label: job.input_path.to_string_lossy().to_string(),
            job,
        })
        .collect()
}
