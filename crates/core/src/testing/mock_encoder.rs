//! Mock prober/encoder for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::fixtures;
use crate::domain::{EncodeAttempt, ImageInfo, MediaInfo};
use crate::encoder::{
    EncodeOptions, Encoder, EncoderError, ImageEncodeOptions, ImageEncoder, ImageProber, Prober,
};

/// A recorded video encode for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedAttempt {
    pub input: PathBuf,
    pub attempt: EncodeAttempt,
    pub output: PathBuf,
    pub options: EncodeOptions,
    /// Whether the mock reported success.
    pub success: bool,
}

/// A recorded still-image encode.
#[derive(Debug, Clone)]
pub struct RecordedImageEncode {
    pub input: PathBuf,
    pub options: ImageEncodeOptions,
    pub output: PathBuf,
    pub success: bool,
}

/// Mock implementation of all four encoder traits.
///
/// Provides controllable behavior for testing:
/// - Scripted source probe results per path
/// - Outputs written to disk with scripted sizes
/// - Produced artifacts probe as a clean VP9/WebM (or PNG) of the attempt's geometry
/// - Injected encode and probe failures
/// - Cancelling a token after a number of encodes
#[derive(Debug, Clone)]
pub struct MockEncoder {
    attempts: Arc<RwLock<Vec<RecordedAttempt>>>,
    image_encodes: Arc<RwLock<Vec<RecordedImageEncode>>>,
    /// Pre-configured probe results by path; these win over everything else.
    probe_results: Arc<RwLock<HashMap<PathBuf, MediaInfo>>>,
    /// Image probe results by path.
    image_results: Arc<RwLock<HashMap<PathBuf, ImageInfo>>>,
    /// What the last encode into each output path looked like.
    produced: Arc<RwLock<HashMap<PathBuf, EncodeAttempt>>>,
    produced_images: Arc<RwLock<HashMap<PathBuf, ImageEncodeOptions>>>,
    /// Sizes of successive outputs; once drained, `default_output_size` is used.
    output_sizes: Arc<RwLock<VecDeque<u64>>>,
    default_output_size: Arc<RwLock<u64>>,
    /// Errors returned by successive encodes.
    encode_errors: Arc<RwLock<VecDeque<EncoderError>>>,
    /// If set, the next probe fails with this error.
    next_probe_error: Arc<RwLock<Option<EncoderError>>>,
    /// Fires the token once this many encodes have been attempted.
    cancel_after: Arc<RwLock<Option<(usize, CancellationToken)>>>,
    encode_delay: Arc<RwLock<Duration>>,
    /// Source info for paths without a scripted result.
    default_media_info: Arc<RwLock<MediaInfo>>,
}

impl Default for MockEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEncoder {
    /// Create a new mock encoder.
    pub fn new() -> Self {
        Self {
            attempts: Arc::new(RwLock::new(Vec::new())),
            image_encodes: Arc::new(RwLock::new(Vec::new())),
            probe_results: Arc::new(RwLock::new(HashMap::new())),
            image_results: Arc::new(RwLock::new(HashMap::new())),
            produced: Arc::new(RwLock::new(HashMap::new())),
            produced_images: Arc::new(RwLock::new(HashMap::new())),
            output_sizes: Arc::new(RwLock::new(VecDeque::new())),
            default_output_size: Arc::new(RwLock::new(64 * 1024)),
            encode_errors: Arc::new(RwLock::new(VecDeque::new())),
            next_probe_error: Arc::new(RwLock::new(None)),
            cancel_after: Arc::new(RwLock::new(None)),
            encode_delay: Arc::new(RwLock::new(Duration::ZERO)),
            default_media_info: Arc::new(RwLock::new(fixtures::source_video())),
        }
    }

    /// Get all recorded video encodes.
    pub async fn recorded_attempts(&self) -> Vec<RecordedAttempt> {
        self.attempts.read().await.clone()
    }

    /// Get the number of video encodes performed.
    pub async fn encode_count(&self) -> usize {
        self.attempts.read().await.len()
    }

    /// Get all recorded image encodes.
    pub async fn recorded_image_encodes(&self) -> Vec<RecordedImageEncode> {
        self.image_encodes.read().await.clone()
    }

    /// Set a probe result for a specific path.
    pub async fn set_probe_result(&self, path: impl AsRef<Path>, info: MediaInfo) {
        self.probe_results
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), info);
    }

    /// Set the image probe result for a specific path.
    pub async fn set_image_result(&self, path: impl AsRef<Path>, info: ImageInfo) {
        self.image_results
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), info);
    }

    /// Set the media info for probing unknown sources.
    pub async fn set_default_media_info(&self, info: MediaInfo) {
        *self.default_media_info.write().await = info;
    }

    /// Script the byte sizes of the next outputs, in order.
    pub async fn set_output_sizes(&self, sizes: Vec<u64>) {
        *self.output_sizes.write().await = sizes.into();
    }

    /// Size of every output once the scripted sizes run out.
    pub async fn set_default_output_size(&self, size: u64) {
        *self.default_output_size.write().await = size;
    }

    /// Make the next encode fail with the given error.
    pub async fn push_encode_error(&self, error: EncoderError) {
        self.encode_errors.write().await.push_back(error);
    }

    /// Make the next `count` encodes fail.
    pub async fn fail_next_encodes(&self, count: usize) {
        let mut errors = self.encode_errors.write().await;
        for _ in 0..count {
            errors.push_back(EncoderError::encode_failed(
                "ffmpeg exited with code 1",
                Some("mock failure".to_string()),
            ));
        }
    }

    /// Configure the next probe to fail with the given error.
    pub async fn set_next_probe_error(&self, error: EncoderError) {
        *self.next_probe_error.write().await = Some(error);
    }

    /// Cancel `token` once `count` encodes (video or image) have run.
    pub async fn cancel_after_encodes(&self, count: usize, token: CancellationToken) {
        *self.cancel_after.write().await = Some((count, token));
    }

    /// Set the simulated encode duration.
    pub async fn set_encode_delay(&self, delay: Duration) {
        *self.encode_delay.write().await = delay;
    }

    async fn next_output_size(&self) -> u64 {
        match self.output_sizes.write().await.pop_front() {
            Some(size) => size,
            None => *self.default_output_size.read().await,
        }
    }

    async fn simulate_work(&self, cancel: &CancellationToken) -> Result<(), EncoderError> {
        let delay = *self.encode_delay.read().await;
        if delay.is_zero() {
            return Ok(());
        }
        tokio::select! {
            _ = cancel.cancelled() => Err(EncoderError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    async fn maybe_cancel(&self) {
        let total =
            self.attempts.read().await.len() + self.image_encodes.read().await.len();
        if let Some((count, token)) = self.cancel_after.read().await.as_ref() {
            if total >= *count {
                token.cancel();
            }
        }
    }

    async fn write_output(&self, output: &Path) -> Result<(), EncoderError> {
        let size = self.next_output_size().await;
        tokio::fs::write(output, vec![0u8; size as usize]).await?;
        Ok(())
    }
}

#[async_trait]
impl Prober for MockEncoder {
    async fn probe(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<MediaInfo, EncoderError> {
        if cancel.is_cancelled() {
            return Err(EncoderError::Cancelled);
        }
        if let Some(err) = self.next_probe_error.write().await.take() {
            return Err(err);
        }
        if let Some(info) = self.probe_results.read().await.get(path) {
            return Ok(info.clone());
        }
        if let Some(attempt) = self.produced.read().await.get(path) {
            let fps = if attempt.fps > 0 { f64::from(attempt.fps) } else { 30.0 };
            return Ok(fixtures::sticker_output(attempt.width, attempt.height, fps));
        }
        Ok(self.default_media_info.read().await.clone())
    }
}

#[async_trait]
impl Encoder for MockEncoder {
    async fn encode(
        &self,
        input: &Path,
        attempt: &EncodeAttempt,
        output: &Path,
        options: EncodeOptions,
        cancel: &CancellationToken,
    ) -> Result<(), EncoderError> {
        if cancel.is_cancelled() {
            return Err(EncoderError::Cancelled);
        }

        let outcome = match self.encode_errors.write().await.pop_front() {
            Some(err) => Err(err),
            None => match self.simulate_work(cancel).await {
                Ok(()) => self.write_output(output).await,
                Err(e) => Err(e),
            },
        };

        self.attempts.write().await.push(RecordedAttempt {
            input: input.to_path_buf(),
            attempt: *attempt,
            output: output.to_path_buf(),
            options,
            success: outcome.is_ok(),
        });
        if outcome.is_ok() {
            self.produced
                .write()
                .await
                .insert(output.to_path_buf(), *attempt);
        }
        self.maybe_cancel().await;

        outcome
    }
}

#[async_trait]
impl ImageEncoder for MockEncoder {
    async fn encode_image(
        &self,
        input: &Path,
        options: ImageEncodeOptions,
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), EncoderError> {
        if cancel.is_cancelled() {
            return Err(EncoderError::Cancelled);
        }

        let outcome = match self.encode_errors.write().await.pop_front() {
            Some(err) => Err(err),
            None => match self.simulate_work(cancel).await {
                Ok(()) => self.write_output(output).await,
                Err(e) => Err(e),
            },
        };

        self.image_encodes.write().await.push(RecordedImageEncode {
            input: input.to_path_buf(),
            options,
            output: output.to_path_buf(),
            success: outcome.is_ok(),
        });
        if outcome.is_ok() {
            self.produced_images
                .write()
                .await
                .insert(output.to_path_buf(), options);
        }
        self.maybe_cancel().await;

        outcome
    }
}

#[async_trait]
impl ImageProber for MockEncoder {
    async fn probe_image(&self, path: &Path) -> Result<ImageInfo, EncoderError> {
        if let Some(err) = self.next_probe_error.write().await.take() {
            return Err(err);
        }
        if let Some(info) = self.image_results.read().await.get(path) {
            return Ok(info.clone());
        }
        match self.produced_images.read().await.get(path) {
            // Square source: fitting and padding both land on side x side.
            Some(options) => Ok(ImageInfo {
                width: options.target_side,
                height: options.target_side,
                format: "png".to_string(),
            }),
            None => Err(EncoderError::InputNotFound {
                path: path.to_path_buf(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InputKind;

    fn attempt() -> EncodeAttempt {
        EncodeAttempt {
            width: 512,
            height: 288,
            fps: 0,
            bitrate_kbps: 699,
            duration_secs: 3,
            kind: InputKind::Video,
            loop_secs: 0,
        }
    }

    #[tokio::test]
    async fn test_encode_writes_scripted_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("a_sticker.webm");
        let mock = MockEncoder::new();
        mock.set_output_sizes(vec![10]).await;
        mock.set_default_output_size(20).await;
        let cancel = CancellationToken::new();

        for expected in [10, 20] {
            mock.encode(Path::new("a.mp4"), &attempt(), &output, EncodeOptions::default(), &cancel)
                .await
                .unwrap();
            assert_eq!(std::fs::metadata(&output).unwrap().len(), expected);
        }
        assert_eq!(mock.encode_count().await, 2);

        let info = mock.probe(&output, &cancel).await.unwrap();
        assert_eq!((info.width, info.height), (512, 288));
        assert_eq!(info.codec_name, "vp9");
    }

    #[tokio::test]
    async fn test_error_injection() {
        let mock = MockEncoder::new();
        mock.fail_next_encodes(1).await;
        let cancel = CancellationToken::new();

        let err = mock
            .encode(
                Path::new("a.mp4"),
                &attempt(),
                Path::new("/nonexistent/out.webm"),
                EncodeOptions::default(),
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EncoderError::EncodeFailed { .. }));

        let recorded = mock.recorded_attempts().await;
        assert_eq!(recorded.len(), 1);
        assert!(!recorded[0].success);

        mock.set_next_probe_error(EncoderError::probe_failed("boom")).await;
        assert!(mock.probe(Path::new("a.mp4"), &cancel).await.is_err());
        assert!(mock.probe(Path::new("a.mp4"), &cancel).await.is_ok());
    }

    #[tokio::test]
    async fn test_cancel_after_encodes() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockEncoder::new();
        let token = CancellationToken::new();
        mock.cancel_after_encodes(1, token.clone()).await;

        mock.encode(
            Path::new("a.mp4"),
            &attempt(),
            &dir.path().join("a.webm"),
            EncodeOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert!(token.is_cancelled());
    }
}
