//! Bounded worker pool that runs tasks and streams their lifecycle events.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::ExecutorConfig;
use super::error::{ExecutorError, TaskError};
use super::handler::{HandlerRegistry, TaskHandler};
use super::types::{Task, TaskEvent, TaskResult, TaskType};
use crate::metrics;

/// Fans tasks out over a fixed number of workers.
///
/// Each started task yields exactly one `Started` and one `Finished` event.
/// The event channel closes when [`run`](Self::run) returns, since the
/// executor drops every sender it was given or created.
pub struct TaskExecutor {
    config: ExecutorConfig,
    handlers: HandlerRegistry,
}

impl TaskExecutor {
    pub fn new(config: ExecutorConfig, handlers: HandlerRegistry) -> Self {
        Self { config, handlers }
    }

    /// Adds or replaces the handler for `task_type`.
    pub fn with_handler(mut self, task_type: TaskType, handler: Arc<dyn TaskHandler>) -> Self {
        self.handlers.insert(task_type, handler);
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Runs `tasks`, reporting progress on `events`.
    ///
    /// Returns [`ExecutorError::Cancelled`] when `cancel` fired during the run.
    /// In-flight tasks finish first; queued tasks never start.
    pub async fn run(
        &self,
        tasks: Vec<Task>,
        events: mpsc::Sender<TaskEvent>,
        cancel: CancellationToken,
    ) -> Result<(), ExecutorError> {
        if events.is_closed() {
            return Err(ExecutorError::InvalidArgument(
                "event receiver is closed".to_string(),
            ));
        }
        if tasks.is_empty() {
            return Ok(());
        }

        let total = tasks.len();
        let worker_count = self.config.worker_count(total);
        info!(tasks = total, workers = worker_count, "Starting task run");

        let (work_tx, work_rx) = mpsc::channel::<Task>(self.config.queue_capacity.max(1));
        let work_rx = Arc::new(Mutex::new(work_rx));
        let handlers = Arc::new(self.handlers.clone());

        let mut workers = JoinSet::new();
        for worker_id in 0..worker_count {
            workers.spawn(worker_loop(
                worker_id,
                Arc::clone(&work_rx),
                Arc::clone(&handlers),
                events.clone(),
                cancel.clone(),
            ));
        }
        // Workers hold the only remaining senders.
        drop(events);

        let mut interrupted = false;
        for task in tasks {
            if cancel.is_cancelled() {
                interrupted = true;
                break;
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    interrupted = true;
                    break;
                }
                sent = work_tx.send(task) => {
                    if sent.is_err() {
                        warn!("All workers stopped before dispatch completed");
                        break;
                    }
                }
            }
        }
        drop(work_tx);

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Worker terminated abnormally");
            }
        }

        if interrupted || cancel.is_cancelled() {
            info!("Task run cancelled");
            return Err(ExecutorError::Cancelled);
        }

        info!(tasks = total, "Task run complete");
        Ok(())
    }
}

async fn worker_loop(
    worker_id: usize,
    work_rx: Arc<Mutex<mpsc::Receiver<Task>>>,
    handlers: Arc<HandlerRegistry>,
    events: mpsc::Sender<TaskEvent>,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            break;
        }

        let next = {
            let mut rx = work_rx.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                task = rx.recv() => task,
            }
        };
        let Some(task) = next else {
            break;
        };
        if cancel.is_cancelled() {
            debug!(worker_id, task_id = task.id, "Dropping task pulled after cancellation");
            break;
        }

        let started = Instant::now();
        info!(worker_id, task_id = task.id, label = %task.label, "Task started");
        if events.send(TaskEvent::started(task.clone())).await.is_err() {
            debug!(task_id = task.id, "Event receiver dropped");
        }

        let handler = handlers.get(&task.task_type).cloned();
        let result = run_task(&task, handler, &cancel).await;

        record_metrics(task.task_type, &result, started);
        match result.failure_message() {
            None => info!(task_id = task.id, label = %task.label, "Task finished"),
            Some(message) => {
                warn!(task_id = task.id, label = %task.label, error = %message, "Task failed")
            }
        }

        if events.send(TaskEvent::finished(task, result)).await.is_err() {
            debug!(worker_id, "Event receiver dropped");
        }
    }
    debug!(worker_id, "Worker exiting");
}

/// Runs one task to a terminal result and fills in a missing input path.
async fn run_task(
    task: &Task,
    handler: Option<Arc<dyn TaskHandler>>,
    cancel: &CancellationToken,
) -> TaskResult {
    let mut result = match handler {
        None => TaskResult::failed(PathBuf::new(), TaskError::NoHandler(task.task_type)),
        Some(handler) => {
            // A panicking handler must still produce a Finished event.
            let owned = task.clone();
            let cancel = cancel.clone();
            match tokio::spawn(async move { handler.handle(&owned, &cancel).await }).await {
                Ok(result) => result,
                Err(e) => TaskResult::failed(PathBuf::new(), TaskError::HandlerPanicked(e.to_string())),
            }
        }
    };

    if result.input_path.as_os_str().is_empty() {
        result.input_path = if task.label.is_empty() {
            task.job.input_path.clone()
        } else {
            PathBuf::from(&task.label)
        };
    }
    result
}

fn record_metrics(task_type: TaskType, result: &TaskResult, started: Instant) {
    let outcome = if result.is_success() {
        "success"
    } else if result.is_cancelled() {
        "cancelled"
    } else {
        "failed"
    };
    metrics::TASKS_TOTAL
        .with_label_values(&[task_type.as_str(), outcome])
        .inc();
    metrics::TASK_DURATION
        .with_label_values(&[task_type.as_str()])
        .observe(started.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InputKind;
    use crate::job::Job;
    use crate::task::TaskEventKind;
    use crate::testing::StubHandler;
    use std::collections::HashMap;

    fn tasks(n: usize, task_type: TaskType) -> Vec<Task> {
        (0..n)
            .map(|id| Task {
                id,
                task_type,
                label: format!("in/{id}.mp4"),
                job: Job::new(format!("in/{id}.mp4"), InputKind::Video),
            })
            .collect()
    }

    async fn collect(mut rx: mpsc::Receiver<TaskEvent>) -> Vec<TaskEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_empty_run_closes_sink() {
        let executor = TaskExecutor::new(ExecutorConfig::default(), HashMap::new());
        let (tx, rx) = mpsc::channel(8);

        executor
            .run(Vec::new(), tx, CancellationToken::new())
            .await
            .unwrap();

        assert!(collect(rx).await.is_empty());
    }

    #[tokio::test]
    async fn test_closed_receiver_is_rejected() {
        let executor = TaskExecutor::new(ExecutorConfig::default(), HashMap::new());
        let (tx, rx) = mpsc::channel(8);
        drop(rx);

        let err = executor
            .run(tasks(1, TaskType::Emoji), tx, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_missing_handler_finishes_with_no_handler() {
        let executor = TaskExecutor::new(ExecutorConfig::default(), HashMap::new());
        let (tx, rx) = mpsc::channel(8);

        executor
            .run(tasks(1, TaskType::Emoji), tx, CancellationToken::new())
            .await
            .unwrap();

        let events = collect(rx).await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, TaskEventKind::Started);
        let result = events[1].result.as_ref().unwrap();
        assert!(matches!(result.error, Some(TaskError::NoHandler(TaskType::Emoji))));
        assert_eq!(result.input_path, PathBuf::from("in/0.mp4"));
    }

    #[tokio::test]
    async fn test_input_path_falls_back_to_label_then_job() {
        let handler = Arc::new(StubHandler::new());
        let executor = TaskExecutor::new(ExecutorConfig::default(), HashMap::new())
            .with_handler(TaskType::VideoSticker, handler);
        let mut list = tasks(2, TaskType::VideoSticker);
        list[1].label = String::new();
        let (tx, rx) = mpsc::channel(8);

        executor.run(list, tx, CancellationToken::new()).await.unwrap();

        let mut finished: Vec<TaskEvent> = collect(rx)
            .await
            .into_iter()
            .filter(|e| e.kind == TaskEventKind::Finished)
            .collect();
        finished.sort_by_key(|e| e.task.id);
        assert_eq!(
            finished[0].result.as_ref().unwrap().input_path,
            PathBuf::from("in/0.mp4")
        );
        assert_eq!(
            finished[1].result.as_ref().unwrap().input_path,
            PathBuf::from("in/1.mp4")
        );
    }

    #[tokio::test]
    async fn test_panicking_handler_still_finishes() {
        let handler = Arc::new(StubHandler::new().panicking());
        let executor = TaskExecutor::new(ExecutorConfig::default(), HashMap::new())
            .with_handler(TaskType::VideoSticker, handler);
        let (tx, rx) = mpsc::channel(8);

        executor
            .run(tasks(1, TaskType::VideoSticker), tx, CancellationToken::new())
            .await
            .unwrap();

        let events = collect(rx).await;
        assert_eq!(events.len(), 2);
        let result = events[1].result.as_ref().unwrap();
        assert!(matches!(result.error, Some(TaskError::HandlerPanicked(_))));
    }

    #[tokio::test]
    async fn test_pre_cancelled_run_starts_nothing() {
        let handler = Arc::new(StubHandler::new());
        let executor = TaskExecutor::new(ExecutorConfig::default(), HashMap::new())
            .with_handler(TaskType::VideoSticker, handler.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (tx, rx) = mpsc::channel(8);

        let err = executor
            .run(tasks(3, TaskType::VideoSticker), tx, cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutorError::Cancelled));
        assert!(collect(rx).await.is_empty());
        assert_eq!(handler.call_count(), 0);
    }
}
