//! Transcode pipelines.
//!
//! [`VideoPipeline`] walks the attempt ladder for videos and GIFs:
//! probe the source, then encode, re-probe and validate each attempt until one
//! passes. Only the last failure survives into the [`TaskResult`].
//!
//! [`ImagePipeline`] produces a static sticker or emoji with a single encode
//! and no retry.
//!
//! [`TaskResult`]: crate::task::TaskResult

mod still;
mod video;

pub use still::{ImagePipeline, ImageTarget};
pub use video::{VideoPipeline, VIDEO_STICKER_SUFFIX};

use std::path::Path;

use crate::job::Job;
use crate::task::TaskError;

/// Creates the job's output directory, if it has one.
async fn ensure_output_dir(job: &Job) -> Result<(), TaskError> {
    if job.output_dir.as_os_str().is_empty() {
        return Ok(());
    }
    tokio::fs::create_dir_all(&job.output_dir)
        .await
        .map_err(|source| TaskError::OutputDir {
            path: job.output_dir.clone(),
            source,
        })
}

/// On-disk size, 0 when the file cannot be read.
async fn file_size(path: &Path) -> u64 {
    tokio::fs::metadata(path).await.map(|m| m.len()).unwrap_or(0)
}
