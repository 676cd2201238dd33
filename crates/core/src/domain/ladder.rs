//! Attempt-ladder generation.
//!
//! Turns the measured properties of a source into an ordered list of encode
//! configurations, most preferred first. The pipeline walks the list until one
//! produced artifact passes validation.
//!
//! Order of levers: bitrate is swept at full resolution first, then the
//! resolution shrinks step by step (each with a full bitrate sweep), and frame
//! rate reduction comes last.

use serde::{Deserialize, Serialize};

use super::constraints::{
    scale_to_fit, GeometryError, Size, DEFAULT_IMAGE_DURATION_SECS, DEFAULT_IMAGE_FPS,
    MAX_STICKER_DURATION_SECS, MAX_STICKER_FPS, MAX_STICKER_SIDE, MAX_STICKER_SIZE_BYTES,
    MIN_BITRATE_KBPS,
};
use super::media::{InputKind, MediaInfo};

const BITRATE_MULTIPLIERS: [f64; 6] = [1.0, 0.85, 0.7, 0.55, 0.45, 0.3];
const SCALE_FACTORS: [f64; 4] = [0.9, 0.8, 0.7, 0.6];
const FALLBACK_FPS: [u32; 3] = [24, 20, 15];

/// One candidate encode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeAttempt {
    pub width: u32,
    pub height: u32,
    /// Output frame rate; 0 keeps the source rate.
    pub fps: u32,
    pub bitrate_kbps: u32,
    pub duration_secs: u32,
    pub kind: InputKind,
    /// Length the input is looped to, 0 for real video.
    pub loop_secs: u32,
}

/// Builds the attempt ladder for a source.
pub fn build_attempts(info: &MediaInfo, kind: InputKind) -> Result<Vec<EncodeAttempt>, GeometryError> {
    let base = scale_to_fit(Size::new(info.width, info.height), MAX_STICKER_SIDE)?;

    let base_fps = base_attempt_fps(info, kind);
    let fallback_fps = fallback_fps_steps(fallback_base_fps(info, kind));
    let duration_secs = attempt_duration(info, kind);
    let bitrate_base = base_bitrate_kbps(duration_secs);

    let source_size = estimate_source_size_bytes(info.size_bytes, info.bitrate_bps, duration_secs);
    let multipliers = choose_bitrate_multipliers(source_size, MAX_STICKER_SIZE_BYTES);

    let loop_secs = match kind {
        InputKind::Image | InputKind::Gif => DEFAULT_IMAGE_DURATION_SECS,
        InputKind::Video => 0,
    };

    let attempt = |size: Size, fps: u32, multiplier: f64| EncodeAttempt {
        width: size.width,
        height: size.height,
        fps,
        bitrate_kbps: (f64::from(bitrate_base) * multiplier) as u32,
        duration_secs,
        kind,
        loop_secs,
    };

    let tiers = 1 + SCALE_FACTORS.len() + fallback_fps.len();
    let mut attempts = Vec::with_capacity(tiers * multipliers.len());

    attempts.extend(multipliers.iter().map(|&m| attempt(base, base_fps, m)));

    for factor in SCALE_FACTORS {
        let size = Size::new(shrink(base.width, factor), shrink(base.height, factor));
        attempts.extend(multipliers.iter().map(|&m| attempt(size, base_fps, m)));
    }

    for fps in fallback_fps {
        attempts.extend(multipliers.iter().map(|&m| attempt(base, fps, m)));
    }

    Ok(attempts)
}

fn shrink(side: u32, factor: f64) -> u32 {
    ((f64::from(side) * factor) as u32).max(1)
}

/// Frame rate for the first tiers. Stills get a fixed rate, sources above the
/// ceiling are capped, everything else keeps its own rate (never upsampled).
fn base_attempt_fps(info: &MediaInfo, kind: InputKind) -> u32 {
    if kind == InputKind::Image {
        return DEFAULT_IMAGE_FPS;
    }
    if info.fps > f64::from(MAX_STICKER_FPS) {
        return MAX_STICKER_FPS;
    }
    0
}

/// Baseline the fallback frame rates must stay below. `None` when the source
/// rate is unknown.
fn fallback_base_fps(info: &MediaInfo, kind: InputKind) -> Option<u32> {
    if kind == InputKind::Image {
        return Some(DEFAULT_IMAGE_FPS);
    }
    if info.fps <= 0.0 {
        return None;
    }
    let fps = info.fps.min(f64::from(MAX_STICKER_FPS)) as u32;
    (fps > 0).then_some(fps)
}

fn fallback_fps_steps(base: Option<u32>) -> Vec<u32> {
    let Some(base) = base else {
        return Vec::new();
    };
    FALLBACK_FPS.into_iter().filter(|&f| f < base).collect()
}

fn attempt_duration(info: &MediaInfo, kind: InputKind) -> u32 {
    match kind {
        InputKind::Image | InputKind::Gif => DEFAULT_IMAGE_DURATION_SECS,
        InputKind::Video => {
            let max = f64::from(MAX_STICKER_DURATION_SECS);
            if info.duration_secs > 0.0 && info.duration_secs < max {
                (info.duration_secs.ceil() as u32).max(1)
            } else {
                MAX_STICKER_DURATION_SECS
            }
        }
    }
}

/// Bitrate that would exactly fill the size budget over `duration_secs`.
pub fn base_bitrate_kbps(duration_secs: u32) -> u32 {
    let duration = f64::from(duration_secs.max(1));
    let kbps = ((MAX_STICKER_SIZE_BYTES * 8) as f64 / duration / 1000.0) as u32;
    kbps.max(MIN_BITRATE_KBPS)
}

/// Best guess of the source size: the file size when known, otherwise
/// derived from the measured bitrate.
fn estimate_source_size_bytes(size_bytes: u64, bitrate_bps: u64, duration_secs: u32) -> u64 {
    let by_bitrate = if bitrate_bps > 0 && duration_secs > 0 {
        bitrate_bps * u64::from(duration_secs) / 8
    } else {
        0
    };
    size_bytes.max(by_bitrate)
}

/// Moves the multiplier matching the expected compression ratio to the front.
fn choose_bitrate_multipliers(source_size: u64, target_size: u64) -> Vec<f64> {
    if source_size == 0 || target_size == 0 {
        return BITRATE_MULTIPLIERS.to_vec();
    }
    let ratio = target_size as f64 / source_size as f64;
    let first = if ratio >= 0.9 {
        1.0
    } else if ratio >= 0.7 {
        0.85
    } else if ratio >= 0.5 {
        0.7
    } else {
        0.55
    };

    let mut ordered = Vec::with_capacity(BITRATE_MULTIPLIERS.len());
    ordered.push(first);
    ordered.extend(BITRATE_MULTIPLIERS.iter().copied().filter(|&m| m != first));
    ordered
}
