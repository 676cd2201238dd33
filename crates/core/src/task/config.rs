//! Executor configuration.

use serde::{Deserialize, Serialize};

/// Configuration for [`TaskExecutor`](super::TaskExecutor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Worker count; 0 uses the number of available CPUs.
    #[serde(default)]
    pub concurrency: usize,

    /// Capacity of the work queue between the dispatcher and the workers.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    1
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            concurrency: 0,
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl ExecutorConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Workers to spawn for `task_count` tasks: at least 1, at most `task_count`.
    pub fn worker_count(&self, task_count: usize) -> usize {
        if task_count == 0 {
            return 0;
        }
        let wanted = if self.concurrency == 0 {
            num_cpus::get()
        } else {
            self.concurrency
        };
        wanted.clamp(1, task_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExecutorConfig::default();
        assert_eq!(config.concurrency, 0);
        assert_eq!(config.queue_capacity, 1);
    }

    #[test]
    fn test_worker_count() {
        let config = ExecutorConfig::default().with_concurrency(4);
        assert_eq!(config.worker_count(0), 0);
        assert_eq!(config.worker_count(2), 2);
        assert_eq!(config.worker_count(10), 4);

        let auto = ExecutorConfig::default();
        assert_eq!(auto.worker_count(1), 1);
        assert_eq!(auto.worker_count(10_000), num_cpus::get().max(1));
    }
}
