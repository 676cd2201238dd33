//! Single-shot pipeline for static stickers and emoji.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::ensure_output_dir;
use crate::domain::{
    validate_emoji_image, validate_static_sticker_image, ImageInfo, InputKind, ValidationIssue,
    EMOJI_SIDE, STATIC_STICKER_SIDE,
};
use crate::encoder::{ImageEncodeOptions, ImageEncoder, ImageProber};
use crate::job::Job;
use crate::metrics;
use crate::task::{TaskError, TaskResult, TaskType};

/// Still-image output flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageTarget {
    /// PNG with its longest side at 512.
    StaticSticker,
    /// 100x100 PNG, padded with transparency.
    Emoji,
}

impl ImageTarget {
    pub fn encode_options(&self) -> ImageEncodeOptions {
        match self {
            Self::StaticSticker => ImageEncodeOptions {
                target_side: STATIC_STICKER_SIDE,
                pad_to_square: false,
            },
            Self::Emoji => ImageEncodeOptions {
                target_side: EMOJI_SIDE,
                pad_to_square: true,
            },
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::StaticSticker => "_sticker.png",
            Self::Emoji => "_emoji.png",
        }
    }

    pub fn validate(&self, info: &ImageInfo) -> Vec<ValidationIssue> {
        match self {
            Self::StaticSticker => validate_static_sticker_image(info),
            Self::Emoji => validate_emoji_image(info),
        }
    }

    pub fn task_type(&self) -> TaskType {
        match self {
            Self::StaticSticker => TaskType::StaticSticker,
            Self::Emoji => TaskType::Emoji,
        }
    }
}

/// Encode once, read back, validate once.
pub struct ImagePipeline<E: ImageEncoder, P: ImageProber> {
    encoder: Arc<E>,
    prober: Arc<P>,
    target: ImageTarget,
}

impl<E: ImageEncoder, P: ImageProber> Clone for ImagePipeline<E, P> {
    fn clone(&self) -> Self {
        Self {
            encoder: Arc::clone(&self.encoder),
            prober: Arc::clone(&self.prober),
            target: self.target,
        }
    }
}

impl<E: ImageEncoder, P: ImageProber> ImagePipeline<E, P> {
    pub fn new(encoder: Arc<E>, prober: Arc<P>, target: ImageTarget) -> Self {
        Self {
            encoder,
            prober,
            target,
        }
    }

    pub fn target(&self) -> ImageTarget {
        self.target
    }

    /// Runs jobs in order, stopping at the first cancelled one.
    pub async fn run(&self, jobs: &[Job], cancel: &CancellationToken) -> Vec<TaskResult> {
        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            let result = self.run_job(job, cancel).await;
            let stop = result.is_cancelled();
            results.push(result);
            if stop {
                break;
            }
        }
        results
    }

    /// Converts a single job.
    pub async fn run_job(&self, job: &Job, cancel: &CancellationToken) -> TaskResult {
        let input = job.input_path.as_path();
        if cancel.is_cancelled() {
            return TaskResult::failed(input, TaskError::Cancelled);
        }

        if job.kind != InputKind::Image {
            return TaskResult::failed(
                input,
                TaskError::UnsupportedInput {
                    path: input.to_path_buf(),
                    task_type: self.target.task_type(),
                },
            );
        }

        if let Err(e) = ensure_output_dir(job).await {
            return TaskResult::failed(input, e);
        }

        let output = job.output_path(self.target.suffix());
        info!(input = %input.display(), target = ?self.target, "Processing image job");

        if let Err(e) = self
            .encoder
            .encode_image(input, self.target.encode_options(), &output, cancel)
            .await
        {
            if !e.is_cancelled() {
                metrics::ENCODE_ATTEMPTS
                    .with_label_values(&["encode_failed"])
                    .inc();
                warn!(input = %input.display(), error = %e, "Image encode failed");
            }
            return TaskResult::failed(input, TaskError::from_encode(e));
        }

        let info = match self.prober.probe_image(&output).await {
            Ok(info) => info,
            Err(e) => {
                metrics::ENCODE_ATTEMPTS
                    .with_label_values(&["probe_failed"])
                    .inc();
                warn!(output = %output.display(), error = %e, "Cannot read produced image");
                return TaskResult::failed(input, TaskError::from_probe(e));
            }
        };

        let issues = self.target.validate(&info);
        if issues.is_empty() {
            metrics::ENCODE_ATTEMPTS.with_label_values(&["accepted"]).inc();
            info!(input = %input.display(), output = %output.display(), "Image accepted");
            return TaskResult::succeeded(input, output);
        }

        metrics::ENCODE_ATTEMPTS.with_label_values(&["rejected"]).inc();
        warn!(input = %input.display(), issues = issues.len(), "Image rejected by validation");
        TaskResult::failed(input, TaskError::ValidationFailed(issues.clone())).with_issues(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_target_options() {
        assert_eq!(
            ImageTarget::StaticSticker.encode_options(),
            ImageEncodeOptions {
                target_side: 512,
                pad_to_square: false
            }
        );
        assert_eq!(
            ImageTarget::Emoji.encode_options(),
            ImageEncodeOptions {
                target_side: 100,
                pad_to_square: true
            }
        );
        assert_eq!(ImageTarget::StaticSticker.suffix(), "_sticker.png");
        assert_eq!(ImageTarget::Emoji.suffix(), "_emoji.png");
        assert_eq!(ImageTarget::Emoji.task_type(), TaskType::Emoji);
    }

    #[test]
    fn test_image_target_validation() {
        let square = ImageInfo {
            width: 100,
            height: 100,
            format: "png".to_string(),
        };
        assert!(ImageTarget::Emoji.validate(&square).is_empty());
        assert!(!ImageTarget::StaticSticker.validate(&square).is_empty());
    }
}
