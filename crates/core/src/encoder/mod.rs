//! Encoder module: probing sources and producing sticker artifacts.
//!
//! The [`Prober`], [`Encoder`], [`ImageEncoder`] and [`ImageProber`] traits are
//! the seams the pipelines use. [`FfmpegEncoder`] implements the first three by
//! shelling out to ffmpeg/ffprobe; [`ImageHeaderProber`] reads PNG/JPEG/GIF/WebP
//! headers in-process.
//!
//! # Example
//!
//! ```ignore
//! use stickerfit_core::encoder::{FfmpegEncoder, Prober};
//!
//! let encoder = FfmpegEncoder::with_defaults();
//! encoder.validate().await?;
//!
//! let info = encoder.probe(Path::new("clip.mp4"), &cancel).await?;
//! println!("{}x{} @ {} fps", info.width, info.height, info.fps);
//! ```

mod config;
mod error;
mod ffmpeg;
mod image_probe;
mod traits;
mod types;

pub use config::{EncoderConfig, FFMPEG_LOG_LEVELS};
pub use error::EncoderError;
pub use ffmpeg::FfmpegEncoder;
pub use image_probe::ImageHeaderProber;
pub use traits::{Encoder, ImageEncoder, ImageProber, Prober};
pub use types::{EncodeOptions, ImageEncodeOptions};
