//! Scriptable task handler for executor tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::encoder::EncoderError;
use crate::task::{Task, TaskError, TaskHandler, TaskResult};

/// What [`StubHandler`] returns for each task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubOutcome {
    /// Success with output `<input>.out`.
    Succeed,
    /// An encode failure.
    Fail,
    /// A result with an empty input path, to be filled in by the executor.
    Blank,
    /// Panics inside the handler.
    Panic,
}

/// A [`TaskHandler`] that records calls and returns a fixed outcome.
#[derive(Debug, Clone)]
pub struct StubHandler {
    outcome: StubOutcome,
    delay: Duration,
    /// Cancelled on the first call.
    cancel_on_call: Option<CancellationToken>,
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<usize>>>,
}

impl Default for StubHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl StubHandler {
    /// A handler that returns a blank result immediately.
    pub fn new() -> Self {
        Self {
            outcome: StubOutcome::Blank,
            delay: Duration::ZERO,
            cancel_on_call: None,
            calls: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_outcome(mut self, outcome: StubOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn failing(self) -> Self {
        self.with_outcome(StubOutcome::Fail)
    }

    pub fn panicking(self) -> Self {
        self.with_outcome(StubOutcome::Panic)
    }

    /// Sleep this long inside every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Cancel `token` when the handler is first invoked.
    pub fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_on_call = Some(token);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Ids of the tasks handled, in call order.
    pub fn seen_ids(&self) -> Vec<usize> {
        self.seen.lock().map(|ids| ids.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TaskHandler for StubHandler {
    async fn handle(&self, task: &Task, _cancel: &CancellationToken) -> TaskResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(task.id);
        }
        if let Some(token) = &self.cancel_on_call {
            token.cancel();
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let input = task.job.input_path.clone();
        match self.outcome {
            StubOutcome::Succeed => {
                let mut output = input.clone().into_os_string();
                output.push(".out");
                TaskResult::succeeded(input, output)
            }
            StubOutcome::Fail => TaskResult::failed(
                input,
                TaskError::Encode(EncoderError::encode_failed("stub failure", None)),
            ),
            StubOutcome::Blank => TaskResult::default(),
            StubOutcome::Panic => panic!("stub handler panicked on task {}", task.id),
        }
    }
}
