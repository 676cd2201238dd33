//! Task execution: typed tasks, handlers and the concurrent executor.
//!
//! ```ignore
//! use stickerfit_core::task::{build_tasks, default_handlers, ExecutorConfig, TaskExecutor, TaskType};
//!
//! let handlers = default_handlers(Arc::new(FfmpegEncoder::with_defaults()), Arc::new(ImageHeaderProber::new()));
//! let executor = TaskExecutor::new(ExecutorConfig::default(), handlers);
//!
//! let (tx, mut rx) = tokio::sync::mpsc::channel(64);
//! let run = executor.run(build_tasks(jobs, TaskType::VideoSticker), tx, cancel.clone());
//! ```

mod config;
mod error;
mod executor;
mod handler;
mod types;

pub use config::ExecutorConfig;
pub use error::{ExecutorError, TaskError};
pub use executor::TaskExecutor;
pub use handler::{
    default_handlers, HandlerRegistry, ImageStickerHandler, TaskHandler, VideoStickerHandler,
};
pub use types::{build_tasks, Task, TaskEvent, TaskEventKind, TaskResult, TaskType};
