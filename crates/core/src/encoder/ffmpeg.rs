//! FFmpeg/FFprobe-backed implementations of the encoder traits.

use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::config::EncoderConfig;
use super::error::EncoderError;
use super::traits::{Encoder, ImageEncoder, Prober};
use super::types::{EncodeOptions, ImageEncodeOptions};
use crate::domain::{EncodeAttempt, InputKind, MediaInfo};

/// Bytes of ffmpeg stderr kept in an error message.
const MAX_STDERR_BYTES: usize = 2048;
const ERROR_LOG_SUFFIX: &str = ".ffmpeg-error.log";

/// Runs the ffmpeg and ffprobe binaries named in [`EncoderConfig`].
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    config: EncoderConfig,
}

impl FfmpegEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(EncoderConfig::default())
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Checks that both binaries can be started.
    pub async fn validate(&self) -> Result<(), EncoderError> {
        Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e, Tool::Ffmpeg))?;

        Command::new(&self.config.ffprobe_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e, Tool::Ffprobe))?;

        Ok(())
    }

    fn base_args(&self) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ]
    }

    /// Builds ffmpeg arguments for an animated sticker attempt.
    fn build_video_args(
        &self,
        input: &Path,
        attempt: &EncodeAttempt,
        output: &Path,
        options: EncodeOptions,
    ) -> Vec<String> {
        let mut args = self.base_args();

        // Stills are held for the loop length, GIFs replay until cut by -t
        match attempt.kind {
            InputKind::Image => args.extend(["-loop".to_string(), "1".to_string()]),
            InputKind::Gif => args.extend(["-stream_loop".to_string(), "-1".to_string()]),
            InputKind::Video => {}
        }
        args.extend(["-i".to_string(), input.to_string_lossy().to_string()]);

        let mut filters = vec![format!("scale={}:{}", attempt.width, attempt.height)];
        if attempt.fps > 0 {
            filters.push(format!("fps={}", attempt.fps));
        }
        if options.trim_secs > 0 {
            filters.push(format!("trim=duration={}", options.trim_secs));
        }
        args.extend(["-vf".to_string(), filters.join(",")]);

        args.extend([
            "-an".to_string(),
            "-c:v".to_string(),
            "libvpx-vp9".to_string(),
        ]);
        if attempt.bitrate_kbps > 0 {
            args.extend(["-b:v".to_string(), format!("{}k", attempt.bitrate_kbps)]);
        }
        if attempt.fps > 0 {
            args.extend(["-r".to_string(), attempt.fps.to_string()]);
        } else {
            args.extend(["-fps_mode".to_string(), "vfr".to_string()]);
        }
        if attempt.duration_secs > 0 {
            args.extend(["-t".to_string(), attempt.duration_secs.to_string()]);
        }

        args.extend(self.config.extra_ffmpeg_args.iter().cloned());
        args.push(output.to_string_lossy().to_string());
        args
    }

    /// Builds ffmpeg arguments for a single PNG frame.
    fn build_image_args(
        &self,
        input: &Path,
        options: ImageEncodeOptions,
        output: &Path,
    ) -> Vec<String> {
        let side = options.target_side;
        let mut args = self.base_args();
        args.extend(["-i".to_string(), input.to_string_lossy().to_string()]);

        let mut filter = format!("scale={side}:{side}:force_original_aspect_ratio=decrease");
        if options.pad_to_square {
            filter.push_str(&format!(
                ",pad={side}:{side}:(ow-iw)/2:(oh-ih)/2:color=0x00000000"
            ));
        }
        args.extend(["-vf".to_string(), filter]);

        args.extend([
            "-frames:v".to_string(),
            "1".to_string(),
            "-c:v".to_string(),
            "png".to_string(),
            "-f".to_string(),
            "image2".to_string(),
        ]);
        args.extend(self.config.extra_ffmpeg_args.iter().cloned());
        args.push(output.to_string_lossy().to_string());
        args
    }

    fn build_probe_args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "stream=codec_type,width,height,r_frame_rate,codec_name,duration".to_string(),
            "-show_entries".to_string(),
            "format=duration,format_name,bit_rate".to_string(),
            "-of".to_string(),
            "json".to_string(),
            path.to_string_lossy().to_string(),
        ]
    }

    /// Parses ffprobe JSON output into MediaInfo.
    ///
    /// Dimensions, frame rate and codec come from the first video stream.
    /// Duration prefers that stream and falls back to the container.
    fn parse_probe_output(output: &str) -> Result<MediaInfo, EncoderError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            #[serde(default)]
            streams: Vec<ProbeStream>,
            #[serde(default)]
            format: ProbeFormat,
        }

        #[derive(Deserialize, Default)]
        struct ProbeFormat {
            #[serde(default)]
            format_name: String,
            duration: Option<String>,
            bit_rate: Option<String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            #[serde(default)]
            codec_type: String,
            codec_name: Option<String>,
            width: Option<u32>,
            height: Option<u32>,
            r_frame_rate: Option<String>,
            duration: Option<String>,
        }

        let probe: ProbeOutput =
            serde_json::from_str(output).map_err(|e| EncoderError::ParseError {
                reason: format!("Failed to parse ffprobe output: {}", e),
            })?;

        let has_audio = probe.streams.iter().any(|s| s.codec_type == "audio");
        let video = probe.streams.iter().find(|s| s.codec_type == "video");

        let stream_duration = video
            .and_then(|s| s.duration.as_deref())
            .map(parse_number)
            .unwrap_or(0.0);
        let duration_secs = if stream_duration > 0.0 {
            stream_duration
        } else {
            probe.format.duration.as_deref().map(parse_number).unwrap_or(0.0)
        };

        Ok(MediaInfo {
            width: video.and_then(|s| s.width).unwrap_or(0),
            height: video.and_then(|s| s.height).unwrap_or(0),
            fps: video
                .and_then(|s| s.r_frame_rate.as_deref())
                .map(parse_frame_rate)
                .unwrap_or(0.0),
            duration_secs,
            has_audio,
            format_name: probe.format.format_name,
            codec_name: video
                .and_then(|s| s.codec_name.clone())
                .unwrap_or_default(),
            bitrate_bps: probe
                .format
                .bit_rate
                .as_deref()
                .map(|b| b.trim().parse::<u64>().unwrap_or_else(|_| parse_number(b) as u64))
                .unwrap_or(0),
            size_bytes: 0,
        })
    }

    /// Runs ffmpeg to completion, killing it if `cancel` fires first.
    async fn run_ffmpeg(
        &self,
        args: Vec<String>,
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), EncoderError> {
        debug!(args = ?args, "Running ffmpeg");

        let child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e, Tool::Ffmpeg))?;

        // Dropping the wait future drops the child, which kills it.
        let finished = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(EncoderError::Cancelled),
            result = child.wait_with_output() => result?,
        };

        if finished.status.success() {
            return Ok(());
        }

        self.encode_failure(&finished, output).await
    }

    async fn encode_failure(&self, finished: &Output, output: &Path) -> Result<(), EncoderError> {
        let stdout = String::from_utf8_lossy(&finished.stdout);
        let stderr = String::from_utf8_lossy(&finished.stderr);

        let reason = match finished.status.code() {
            Some(code) => format!("ffmpeg exited with code {}", code),
            None => "ffmpeg terminated by signal".to_string(),
        };
        let err = EncoderError::encode_failed(reason, stderr_tail(&stderr));

        if !self.config.write_error_logs {
            return Err(err);
        }

        let log_path = error_log_path(output);
        match tokio::fs::write(&log_path, format_error_log(&stdout, &stderr)).await {
            Ok(()) => Err(err.with_log_path(&log_path)),
            Err(e) => {
                warn!(path = %log_path.display(), error = %e, "Failed to write ffmpeg error log");
                Err(err)
            }
        }
    }

    fn spawn_error(&self, e: std::io::Error, tool: Tool) -> EncoderError {
        if e.kind() != std::io::ErrorKind::NotFound {
            return EncoderError::Io(e);
        }
        match tool {
            Tool::Ffmpeg => EncoderError::FfmpegNotFound {
                path: self.config.ffmpeg_path.clone(),
            },
            Tool::Ffprobe => EncoderError::FfprobeNotFound {
                path: self.config.ffprobe_path.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Tool {
    Ffmpeg,
    Ffprobe,
}

#[async_trait]
impl Prober for FfmpegEncoder {
    async fn probe(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<MediaInfo, EncoderError> {
        if !path.exists() {
            return Err(EncoderError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let mut command = Command::new(&self.config.ffprobe_path);
        command
            .args(Self::build_probe_args(path))
            .stdin(Stdio::null())
            .kill_on_drop(true);
        let run = command.output();

        let finished = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(EncoderError::Cancelled),
            result = run => result.map_err(|e| self.spawn_error(e, Tool::Ffprobe))?,
        };

        if !finished.status.success() {
            return Err(EncoderError::probe_failed(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&finished.stderr).trim()
            )));
        }

        Self::parse_probe_output(&String::from_utf8_lossy(&finished.stdout))
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    async fn encode(
        &self,
        input: &Path,
        attempt: &EncodeAttempt,
        output: &Path,
        options: EncodeOptions,
        cancel: &CancellationToken,
    ) -> Result<(), EncoderError> {
        let args = self.build_video_args(input, attempt, output, options);
        self.run_ffmpeg(args, output, cancel).await
    }
}

#[async_trait]
impl ImageEncoder for FfmpegEncoder {
    async fn encode_image(
        &self,
        input: &Path,
        options: ImageEncodeOptions,
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), EncoderError> {
        let args = self.build_image_args(input, options, output);
        self.run_ffmpeg(args, output, cancel).await
    }
}

/// Parses a rational rate like `30000/1001`. Anything else is unknown (0).
fn parse_frame_rate(value: &str) -> f64 {
    let Some((num, den)) = value.split_once('/') else {
        return 0.0;
    };
    let num = parse_number(num);
    let den = parse_number(den);
    if den == 0.0 {
        return 0.0;
    }
    num / den
}

fn parse_number(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(0.0)
}

/// Last [`MAX_STDERR_BYTES`] of trimmed stderr, or `None` when blank.
fn stderr_tail(stderr: &str) -> Option<String> {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.len() <= MAX_STDERR_BYTES {
        return Some(trimmed.to_string());
    }
    let mut start = trimmed.len() - MAX_STDERR_BYTES;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    Some(trimmed[start..].to_string())
}

fn error_log_path(output: &Path) -> PathBuf {
    let mut name: OsString = output.as_os_str().to_owned();
    name.push(ERROR_LOG_SUFFIX);
    PathBuf::from(name)
}

fn format_error_log(stdout: &str, stderr: &str) -> String {
    let mut log = String::new();
    for (title, content) in [("STDOUT", stdout), ("STDERR", stderr)] {
        log.push_str(title);
        log.push_str(":\n");
        if content.trim().is_empty() {
            log.push_str("<empty>\n");
            continue;
        }
        log.push_str(content);
        if !content.ends_with('\n') {
            log.push('\n');
        }
    }
    log
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(kind: InputKind, fps: u32) -> EncodeAttempt {
        EncodeAttempt {
            width: 512,
            height: 288,
            fps,
            bitrate_kbps: 699,
            duration_secs: 3,
            kind,
            loop_secs: 0,
        }
    }

    fn position(args: &[String], needle: &str) -> Option<usize> {
        args.iter().position(|a| a == needle)
    }

    #[test]
    fn test_build_video_args() {
        let encoder = FfmpegEncoder::with_defaults();
        let args = encoder.build_video_args(
            Path::new("/in/clip.mp4"),
            &attempt(InputKind::Video, 30),
            Path::new("/out/clip_sticker.webm"),
            EncodeOptions::default(),
        );

        assert_eq!(args[0], "-y");
        assert!(position(&args, "-loop").is_none());
        assert!(position(&args, "-stream_loop").is_none());
        let vf = position(&args, "-vf").unwrap();
        assert_eq!(args[vf + 1], "scale=512:288,fps=30");
        assert!(args.contains(&"-an".to_string()));
        assert!(args.contains(&"libvpx-vp9".to_string()));
        let bv = position(&args, "-b:v").unwrap();
        assert_eq!(args[bv + 1], "699k");
        let r = position(&args, "-r").unwrap();
        assert_eq!(args[r + 1], "30");
        let t = position(&args, "-t").unwrap();
        assert_eq!(args[t + 1], "3");
        assert_eq!(args.last().unwrap(), "/out/clip_sticker.webm");
    }

    #[test]
    fn test_build_video_args_unknown_fps_uses_vfr() {
        let encoder = FfmpegEncoder::with_defaults();
        let args = encoder.build_video_args(
            Path::new("a.mp4"),
            &attempt(InputKind::Video, 0),
            Path::new("a.webm"),
            EncodeOptions { trim_secs: 3 },
        );

        let vf = position(&args, "-vf").unwrap();
        assert_eq!(args[vf + 1], "scale=512:288,trim=duration=3");
        assert!(position(&args, "-r").is_none());
        let mode = position(&args, "-fps_mode").unwrap();
        assert_eq!(args[mode + 1], "vfr");
    }

    #[test]
    fn test_looping_flags_precede_input() {
        let encoder = FfmpegEncoder::with_defaults();

        let args = encoder.build_video_args(
            Path::new("still.png"),
            &attempt(InputKind::Image, 30),
            Path::new("still.webm"),
            EncodeOptions::default(),
        );
        let loop_at = position(&args, "-loop").unwrap();
        assert_eq!(args[loop_at + 1], "1");
        assert!(loop_at < position(&args, "-i").unwrap());

        let args = encoder.build_video_args(
            Path::new("anim.gif"),
            &attempt(InputKind::Gif, 24),
            Path::new("anim.webm"),
            EncodeOptions::default(),
        );
        let loop_at = position(&args, "-stream_loop").unwrap();
        assert_eq!(args[loop_at + 1], "-1");
        assert!(loop_at < position(&args, "-i").unwrap());
    }

    #[test]
    fn test_extra_args_precede_output() {
        let mut config = EncoderConfig::default();
        config.extra_ffmpeg_args = vec!["-threads".to_string(), "2".to_string()];
        let encoder = FfmpegEncoder::new(config);

        let args = encoder.build_video_args(
            Path::new("a.mp4"),
            &attempt(InputKind::Video, 30),
            Path::new("a.webm"),
            EncodeOptions::default(),
        );
        let n = args.len();
        assert_eq!(&args[n - 3..], &["-threads", "2", "a.webm"]);
    }

    #[test]
    fn test_build_image_args() {
        let encoder = FfmpegEncoder::with_defaults();

        let args = encoder.build_image_args(
            Path::new("face.jpg"),
            ImageEncodeOptions {
                target_side: 100,
                pad_to_square: true,
            },
            Path::new("face_emoji.png"),
        );
        let vf = position(&args, "-vf").unwrap();
        assert_eq!(
            args[vf + 1],
            "scale=100:100:force_original_aspect_ratio=decrease,pad=100:100:(ow-iw)/2:(oh-ih)/2:color=0x00000000"
        );
        let frames = position(&args, "-frames:v").unwrap();
        assert_eq!(args[frames + 1], "1");
        assert!(args.contains(&"png".to_string()));
        assert!(args.contains(&"image2".to_string()));

        let args = encoder.build_image_args(
            Path::new("face.jpg"),
            ImageEncodeOptions {
                target_side: 512,
                pad_to_square: false,
            },
            Path::new("face_sticker.png"),
        );
        let vf = position(&args, "-vf").unwrap();
        assert_eq!(args[vf + 1], "scale=512:512:force_original_aspect_ratio=decrease");
    }

    #[test]
    fn test_parse_probe_output_video() {
        let json = r#"{
            "programs": [],
            "streams": [
                {
                    "codec_type": "video",
                    "codec_name": "h264",
                    "width": 1920,
                    "height": 1080,
                    "r_frame_rate": "30000/1001",
                    "duration": "4.004"
                },
                { "codec_type": "audio", "codec_name": "aac" }
            ],
            "format": {
                "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
                "duration": "4.100000",
                "bit_rate": "2500000"
            }
        }"#;

        let info = FfmpegEncoder::parse_probe_output(json).unwrap();
        assert_eq!(info.width, 1920);
        assert_eq!(info.height, 1080);
        assert!((info.fps - 29.97).abs() < 0.01);
        assert!((info.duration_secs - 4.004).abs() < 1e-9);
        assert!(info.has_audio);
        assert_eq!(info.codec_name, "h264");
        assert_eq!(info.format_name, "mov,mp4,m4a,3gp,3g2,mj2");
        assert_eq!(info.bitrate_bps, 2_500_000);
        assert_eq!(info.size_bytes, 0);
    }

    #[test]
    fn test_parse_probe_output_falls_back_to_format_duration() {
        let json = r#"{
            "streams": [
                { "codec_type": "video", "codec_name": "vp9", "width": 512,
                  "height": 512, "r_frame_rate": "30/1" }
            ],
            "format": { "format_name": "matroska,webm", "duration": "2.966000" }
        }"#;

        let info = FfmpegEncoder::parse_probe_output(json).unwrap();
        assert!((info.duration_secs - 2.966).abs() < 1e-9);
        assert!(!info.has_audio);
        assert_eq!(info.fps, 30.0);
        assert_eq!(info.bitrate_bps, 0);
    }

    #[test]
    fn test_parse_probe_output_rejects_garbage() {
        let err = FfmpegEncoder::parse_probe_output("not json").unwrap_err();
        assert!(matches!(err, EncoderError::ParseError { .. }));
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("25/1"), 25.0);
        assert_eq!(parse_frame_rate("0/0"), 0.0);
        assert_eq!(parse_frame_rate("30"), 0.0);
        assert_eq!(parse_frame_rate(""), 0.0);
    }

    #[test]
    fn test_stderr_tail() {
        assert_eq!(stderr_tail("  \n"), None);
        assert_eq!(stderr_tail(" oops \n").as_deref(), Some("oops"));

        let long = format!("{}{}", "a".repeat(100), "b".repeat(MAX_STDERR_BYTES));
        assert_eq!(stderr_tail(&long).unwrap(), "b".repeat(MAX_STDERR_BYTES));

        let multibyte = "é".repeat(MAX_STDERR_BYTES);
        let tail = stderr_tail(&multibyte).unwrap();
        assert!(tail.len() <= MAX_STDERR_BYTES);
        assert!(tail.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_format_error_log() {
        assert_eq!(format_error_log("", " "), "STDOUT:\n<empty>\nSTDERR:\n<empty>\n");
        assert_eq!(
            format_error_log("frame=1", "boom\n"),
            "STDOUT:\nframe=1\nSTDERR:\nboom\n"
        );
    }

    #[test]
    fn test_error_log_path() {
        assert_eq!(
            error_log_path(Path::new("/out/a_sticker.webm")),
            PathBuf::from("/out/a_sticker.webm.ffmpeg-error.log")
        );
    }

    #[tokio::test]
    async fn test_missing_binaries() {
        let encoder = FfmpegEncoder::new(EncoderConfig::with_paths(
            PathBuf::from("/nonexistent/ffmpeg"),
            PathBuf::from("/nonexistent/ffprobe"),
        ));
        let err = encoder.validate().await.unwrap_err();
        assert!(matches!(err, EncoderError::FfmpegNotFound { .. }));

        let err = encoder
            .encode(
                Path::new("a.mp4"),
                &attempt(InputKind::Video, 30),
                Path::new("a.webm"),
                EncodeOptions::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(err.is_missing_tool());
    }

    #[tokio::test]
    async fn test_probe_missing_input() {
        let encoder = FfmpegEncoder::with_defaults();
        let err = encoder
            .probe(Path::new("/nonexistent/clip.mp4"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EncoderError::InputNotFound { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_run_writes_error_log() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("a_sticker.webm");
        // `false` ignores its arguments and exits 1
        let encoder = FfmpegEncoder::new(EncoderConfig::with_paths(
            PathBuf::from("false"),
            PathBuf::from("false"),
        ));

        let err = encoder
            .encode(
                Path::new("a.mp4"),
                &attempt(InputKind::Video, 30),
                &output,
                EncodeOptions::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        let log_path = dir.path().join("a_sticker.webm.ffmpeg-error.log");
        match err {
            EncoderError::EncodeFailed {
                reason,
                stderr,
                log_path: Some(path),
            } => {
                assert_eq!(reason, "ffmpeg exited with code 1");
                assert!(stderr.is_none());
                assert_eq!(path, log_path);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let log = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(log, "STDOUT:\n<empty>\nSTDERR:\n<empty>\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_error_log_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("a_emoji.png");
        let encoder = FfmpegEncoder::new(
            EncoderConfig::with_paths(PathBuf::from("false"), PathBuf::from("false"))
                .with_error_logs(false),
        );

        let err = encoder
            .encode_image(
                Path::new("a.png"),
                ImageEncodeOptions {
                    target_side: 100,
                    pad_to_square: true,
                },
                &output,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, EncoderError::EncodeFailed { log_path: None, .. }));
        assert!(!dir.path().join("a_emoji.png.ffmpeg-error.log").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancelled_before_completion() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, b"x").unwrap();
        let encoder = FfmpegEncoder::new(EncoderConfig::with_paths(
            PathBuf::from("false"),
            PathBuf::from("false"),
        ));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = encoder.probe(&input, &cancel).await.unwrap_err();
        assert!(err.is_cancelled());

        let err = encoder
            .encode(
                &input,
                &attempt(InputKind::Video, 30),
                &dir.path().join("clip.webm"),
                EncodeOptions::default(),
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, b"x").unwrap();
        let encoder = FfmpegEncoder::new(EncoderConfig::with_paths(
            PathBuf::from("false"),
            PathBuf::from("false"),
        ));

        let err = encoder
            .probe(&input, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EncoderError::ProbeFailed { .. }));
    }
}
