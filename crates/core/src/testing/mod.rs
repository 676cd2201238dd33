//! Testing utilities and mock implementations.
//!
//! These stand in for ffmpeg/ffprobe and for real task handlers, so the
//! pipelines and the executor can be exercised without external tools.
//!
//! # Example
//!
//! ```rust,ignore
//! use stickerfit_core::testing::MockEncoder;
//!
//! let media = Arc::new(MockEncoder::new());
//! media.set_output_sizes(vec![400 * 1024, 200 * 1024]).await;
//!
//! let pipeline = VideoPipeline::new(media.clone(), media.clone());
//! let result = pipeline.run_job(&job, &cancel).await;
//! assert_eq!(media.encode_count().await, 2);
//! ```

mod mock_encoder;
mod stub_handler;

pub use mock_encoder::{MockEncoder, RecordedAttempt, RecordedImageEncode};
pub use stub_handler::{StubHandler, StubOutcome};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::domain::{InputKind, MediaInfo};
    use crate::job::Job;
    use crate::task::{Task, TaskType};

    /// A 1080p, 30 fps, 5 second h264 clip with an audio track.
    pub fn source_video() -> MediaInfo {
        MediaInfo {
            width: 1920,
            height: 1080,
            fps: 30.0,
            duration_secs: 5.0,
            has_audio: true,
            format_name: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
            codec_name: "h264".to_string(),
            bitrate_bps: 0,
            size_bytes: 0,
        }
    }

    /// A clean VP9/WebM sticker of the given geometry.
    pub fn sticker_output(width: u32, height: u32, fps: f64) -> MediaInfo {
        MediaInfo {
            width,
            height,
            fps,
            duration_secs: 3.0,
            has_audio: false,
            format_name: "matroska,webm".to_string(),
            codec_name: "vp9".to_string(),
            bitrate_bps: 0,
            size_bytes: 0,
        }
    }

    /// A task for `input_path`, with the kind detected from its extension.
    pub fn task(id: usize, task_type: TaskType, input_path: &str) -> Task {
        let kind = InputKind::detect(std::path::Path::new(input_path)).unwrap_or(InputKind::Video);
        Task {
            id,
            task_type,
            label: input_path.to_string(),
            job: Job::new(input_path, kind),
        }
    }
}
