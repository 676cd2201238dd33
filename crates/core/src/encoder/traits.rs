//! Trait definitions for the encoder module.
//!
//! Pipelines only talk to these seams, so tests can swap ffmpeg for the
//! mocks in [`crate::testing`].

use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use super::error::EncoderError;
use super::types::{EncodeOptions, ImageEncodeOptions};
use crate::domain::{EncodeAttempt, ImageInfo, MediaInfo};

/// Measures a media file.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probes `path`. The returned info has `size_bytes` unset.
    async fn probe(&self, path: &Path, cancel: &CancellationToken)
        -> Result<MediaInfo, EncoderError>;
}

/// Produces a VP9/WebM sticker for one attempt configuration.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Encodes `input` into `output`, overwriting any existing file.
    async fn encode(
        &self,
        input: &Path,
        attempt: &EncodeAttempt,
        output: &Path,
        options: EncodeOptions,
        cancel: &CancellationToken,
    ) -> Result<(), EncoderError>;
}

/// Produces a single-frame PNG.
#[async_trait]
pub trait ImageEncoder: Send + Sync {
    async fn encode_image(
        &self,
        input: &Path,
        options: ImageEncodeOptions,
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), EncoderError>;
}

/// Reads the dimensions and format of a still image.
#[async_trait]
pub trait ImageProber: Send + Sync {
    async fn probe_image(&self, path: &Path) -> Result<ImageInfo, EncoderError>;
}
