//! Error types for the encoder module.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by the probe and encode services.
#[derive(Debug, Error)]
pub enum EncoderError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {}", path.display())]
    FfmpegNotFound { path: PathBuf },

    /// FFprobe binary not found.
    #[error("FFprobe not found at path: {}", path.display())]
    FfprobeNotFound { path: PathBuf },

    /// Input file not found.
    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// Failed to probe media file.
    #[error("Failed to probe media file: {reason}")]
    ProbeFailed { reason: String },

    /// Failed to parse prober output.
    #[error("Failed to parse media info: {reason}")]
    ParseError { reason: String },

    /// The encoder ran but did not produce a usable output.
    #[error("Encode failed: {reason}{}", diagnostics(.stderr, .log_path))]
    EncodeFailed {
        reason: String,
        stderr: Option<String>,
        log_path: Option<PathBuf>,
    },

    /// I/O error while running the external tools.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The run was cancelled while the tool was running.
    #[error("Encode cancelled")]
    Cancelled,
}

fn diagnostics(stderr: &Option<String>, log_path: &Option<PathBuf>) -> String {
    let mut out = String::new();
    if let Some(stderr) = stderr {
        out.push_str(": ");
        out.push_str(stderr);
    }
    if let Some(path) = log_path {
        out.push_str(&format!(" (ffmpeg log: {})", path.display()));
    }
    out
}

impl EncoderError {
    /// Creates a new encode failed error with stderr output.
    pub fn encode_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::EncodeFailed {
            reason: reason.into(),
            stderr,
            log_path: None,
        }
    }

    /// Creates a new probe failed error.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }

    /// Attaches the path of a written diagnostics log to an encode failure.
    pub fn with_log_path(self, path: &Path) -> Self {
        match self {
            Self::EncodeFailed { reason, stderr, .. } => Self::EncodeFailed {
                reason,
                stderr,
                log_path: Some(path.to_path_buf()),
            },
            other => other,
        }
    }

    /// Whether this error came from the cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether the failure is a missing tool rather than a bad input.
    pub fn is_missing_tool(&self) -> bool {
        matches!(self, Self::FfmpegNotFound { .. } | Self::FfprobeNotFound { .. })
    }
}
