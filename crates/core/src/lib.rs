//! Adaptive transcoder that fits images, GIFs and clips into sticker and
//! emoji limits.

pub mod config;
pub mod domain;
pub mod encoder;
pub mod job;
pub mod metrics;
pub mod pipeline;
pub mod target;
pub mod task;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, load_default_config, validate_config, Config, ConfigError,
};
pub use domain::{EncodeAttempt, ImageInfo, InputKind, IssueCode, MediaInfo, ValidationIssue};
pub use encoder::{EncoderConfig, EncoderError, FfmpegEncoder, ImageHeaderProber};
pub use job::{Job, JobPlanner, SelectionExpander, SelectionItem, Skipped};
pub use pipeline::{ImagePipeline, ImageTarget, VideoPipeline};
pub use target::{evaluate_target, filter_jobs_for_target, InputSummary, TargetHint, TargetStatus, TargetType};
pub use task::{
    build_tasks, default_handlers, ExecutorConfig, ExecutorError, Task, TaskError, TaskEvent,
    TaskEventKind, TaskExecutor, TaskHandler, TaskResult, TaskType,
};
