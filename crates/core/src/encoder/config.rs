//! Configuration for the ffmpeg-backed encoder.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Log levels accepted by ffmpeg's `-loglevel`.
pub const FFMPEG_LOG_LEVELS: &[&str] = &[
    "quiet", "panic", "fatal", "error", "warning", "info", "verbose", "debug", "trace",
];

/// Configuration for [`FfmpegEncoder`](super::FfmpegEncoder).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Additional ffmpeg output arguments, inserted before the output path.
    #[serde(default)]
    pub extra_ffmpeg_args: Vec<String>,

    /// Write `<output>.ffmpeg-error.log` next to the output when ffmpeg fails.
    #[serde(default = "default_write_error_logs")]
    pub write_error_logs: bool,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_log_level() -> String {
    "error".to_string()
}

fn default_write_error_logs() -> bool {
    true
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            ffmpeg_log_level: default_log_level(),
            extra_ffmpeg_args: Vec::new(),
            write_error_logs: default_write_error_logs(),
        }
    }
}

impl EncoderConfig {
    /// Creates a new config with custom ffmpeg/ffprobe paths.
    pub fn with_paths(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            ..Default::default()
        }
    }

    /// Enables or disables the ffmpeg error log files.
    pub fn with_error_logs(mut self, enabled: bool) -> Self {
        self.write_error_logs = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EncoderConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.ffmpeg_log_level, "error");
        assert!(config.write_error_logs);
        assert!(FFMPEG_LOG_LEVELS.contains(&config.ffmpeg_log_level.as_str()));
    }

    #[test]
    fn test_config_builder() {
        let config = EncoderConfig::with_paths(
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffprobe"),
        )
        .with_error_logs(false);

        assert_eq!(config.ffmpeg_path, PathBuf::from("/usr/local/bin/ffmpeg"));
        assert_eq!(config.ffprobe_path, PathBuf::from("/usr/local/bin/ffprobe"));
        assert!(!config.write_error_logs);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EncoderConfig = toml::from_str(r#"ffmpeg_path = "/opt/ffmpeg""#).unwrap();
        assert_eq!(config.ffmpeg_path, PathBuf::from("/opt/ffmpeg"));
        assert_eq!(config.ffprobe_path, PathBuf::from("ffprobe"));
        assert!(config.extra_ffmpeg_args.is_empty());
    }
}
