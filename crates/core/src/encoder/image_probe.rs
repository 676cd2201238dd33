//! Header-only still-image prober backed by the `image` crate.

use async_trait::async_trait;
use image::{ImageFormat, ImageReader};
use std::path::{Path, PathBuf};

use super::error::EncoderError;
use super::traits::ImageProber;
use crate::domain::ImageInfo;

/// Reads dimensions and format from the file header without decoding pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageHeaderProber;

impl ImageHeaderProber {
    pub fn new() -> Self {
        Self
    }

    fn read_header(path: &Path) -> Result<ImageInfo, EncoderError> {
        if !path.exists() {
            return Err(EncoderError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| EncoderError::probe_failed("unrecognized image format"))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| EncoderError::probe_failed(format!("failed to read image header: {}", e)))?;

        Ok(ImageInfo {
            width,
            height,
            format: format_name(format),
        })
    }
}

fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Png => "png".to_string(),
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        other => format!("{:?}", other).to_ascii_lowercase(),
    }
}

#[async_trait]
impl ImageProber for ImageHeaderProber {
    async fn probe_image(&self, path: &Path) -> Result<ImageInfo, EncoderError> {
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::read_header(&path))
            .await
            .map_err(|e| EncoderError::probe_failed(format!("image probe task failed: {}", e)))?
    }
}
