//! Output validation.
//!
//! Every rule is evaluated; a failing artifact reports all of its violations
//! at once. An empty list means the artifact is accepted.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::constraints::{
    EMOJI_SIDE, MAX_STICKER_DURATION_SECS, MAX_STICKER_FPS, MAX_STICKER_SIDE,
    MAX_STICKER_SIZE_BYTES, STATIC_STICKER_SIDE,
};
use super::media::{ImageInfo, MediaInfo};

const REQUIRED_VIDEO_CODEC: &str = "vp9";
const REQUIRED_CONTAINER: &str = "webm";
const REQUIRED_IMAGE_FORMAT: &str = "png";

/// Stable identifier of a violated constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    Format,
    Size,
    Fps,
    Duration,
    Audio,
    Codec,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::Size => "size",
            Self::Fps => "fps",
            Self::Duration => "duration",
            Self::Audio => "audio",
            Self::Codec => "codec",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Checks a produced video sticker against the target limits.
pub fn validate_output(info: &MediaInfo, size_bytes: u64) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if size_bytes > MAX_STICKER_SIZE_BYTES {
        issues.push(ValidationIssue::new(IssueCode::Size, "size exceeds limit"));
    }
    if info.fps > f64::from(MAX_STICKER_FPS) {
        issues.push(ValidationIssue::new(IssueCode::Fps, "fps exceeds limit"));
    }
    if info.duration_secs > f64::from(MAX_STICKER_DURATION_SECS) {
        issues.push(ValidationIssue::new(
            IssueCode::Duration,
            "duration exceeds limit",
        ));
    }
    if info.has_audio {
        issues.push(ValidationIssue::new(IssueCode::Audio, "audio stream present"));
    }
    if !contains_ignore_case(&info.codec_name, REQUIRED_VIDEO_CODEC) {
        issues.push(ValidationIssue::new(IssueCode::Codec, "codec is not vp9"));
    }
    if !contains_ignore_case(&info.format_name, REQUIRED_CONTAINER) {
        issues.push(ValidationIssue::new(IssueCode::Format, "format is not webm"));
    }
    check_fitted_side(&mut issues, info.width, info.height, MAX_STICKER_SIDE);

    issues
}

/// Checks a produced static sticker (PNG, one side 512).
pub fn validate_static_sticker_image(info: &ImageInfo) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check_png(&mut issues, &info.format);
    check_fitted_side(&mut issues, info.width, info.height, STATIC_STICKER_SIDE);
    issues
}

/// Checks a produced emoji (PNG, exactly 100x100).
pub fn validate_emoji_image(info: &ImageInfo) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check_png(&mut issues, &info.format);
    if info.width != EMOJI_SIDE || info.height != EMOJI_SIDE {
        issues.push(ValidationIssue::new(
            IssueCode::Size,
            format!("dimension must be {}x{}", EMOJI_SIDE, EMOJI_SIDE),
        ));
    }
    issues
}

fn check_png(issues: &mut Vec<ValidationIssue>, format: &str) {
    if !format.eq_ignore_ascii_case(REQUIRED_IMAGE_FORMAT) {
        issues.push(ValidationIssue::new(IssueCode::Format, "format is not png"));
    }
}

fn check_fitted_side(issues: &mut Vec<ValidationIssue>, width: u32, height: u32, side: u32) {
    if width != side && height != side {
        issues.push(ValidationIssue::new(
            IssueCode::Size,
            format!("one side must be {}", side),
        ));
    }
    if width > side || height > side {
        issues.push(ValidationIssue::new(
            IssueCode::Size,
            format!("dimension exceeds {}", side),
        ));
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_ascii_lowercase().contains(needle)
}
