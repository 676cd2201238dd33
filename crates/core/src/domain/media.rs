//! Measured media properties and input classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Category of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Video,
    Image,
    Gif,
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "mkv", "avi"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];
const GIF_EXTENSIONS: &[&str] = &["gif"];

/// The file extension is not one we know how to convert.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported input: {}", path.display())]
pub struct InputKindError {
    pub path: PathBuf,
}

impl InputKind {
    /// Classifies a path by its (case-insensitive) extension.
    pub fn detect(path: &Path) -> Result<Self, InputKindError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if GIF_EXTENSIONS.contains(&ext.as_str()) {
            Ok(Self::Gif)
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Ok(Self::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Ok(Self::Video)
        } else {
            Err(InputKindError {
                path: path.to_path_buf(),
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
            Self::Gif => "gif",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Properties of a media file as reported by the prober.
///
/// `size_bytes` is not reported by the prober; callers fill it in from the
/// filesystem with [`MediaInfo::with_size_bytes`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub width: u32,
    pub height: u32,
    /// Frames per second, 0 when unknown.
    pub fps: f64,
    /// Duration in seconds, 0 when unknown.
    pub duration_secs: f64,
    pub has_audio: bool,
    /// Container name as reported by the prober, e.g. `matroska,webm`.
    pub format_name: String,
    /// Codec of the first video stream.
    pub codec_name: String,
    /// Overall bitrate in bits per second, 0 when unknown.
    pub bitrate_bps: u64,
    pub size_bytes: u64,
}

impl MediaInfo {
    /// Returns a copy carrying the on-disk size of the file.
    pub fn with_size_bytes(self, size_bytes: u64) -> Self {
        Self { size_bytes, ..self }
    }
}

/// Dimensions and format of a still image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: String,
}
