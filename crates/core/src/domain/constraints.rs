//! Target limits and the fit-to-box scaler.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest side of a video sticker, in pixels.
pub const MAX_STICKER_SIDE: u32 = 512;
/// Frame-rate ceiling for video stickers.
pub const MAX_STICKER_FPS: u32 = 30;
/// Duration ceiling for video stickers, in seconds.
pub const MAX_STICKER_DURATION_SECS: u32 = 3;
/// Byte-size ceiling for video stickers.
pub const MAX_STICKER_SIZE_BYTES: u64 = 256 * 1024;
/// Frame rate used when a still image is turned into a clip.
pub const DEFAULT_IMAGE_FPS: u32 = 30;
/// Loop length for stills and GIFs, in seconds.
pub const DEFAULT_IMAGE_DURATION_SECS: u32 = 3;
/// Longest side of a static sticker.
pub const STATIC_STICKER_SIDE: u32 = 512;
/// Side of a (square) emoji.
pub const EMOJI_SIDE: u32 = 100;
/// Lower bound for the base bitrate of the attempt ladder.
pub const MIN_BITRATE_KBPS: u32 = 150;

/// Source dimensions that cannot be scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid geometry: {width}x{height}")]
pub struct GeometryError {
    pub width: u32,
    pub height: u32,
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Scales `src` so that its larger side equals `max_side`, keeping the aspect
/// ratio. The smaller side is rounded down and never drops below 1.
pub fn scale_to_fit(src: Size, max_side: u32) -> Result<Size, GeometryError> {
    if src.width == 0 || src.height == 0 {
        return Err(GeometryError {
            width: src.width,
            height: src.height,
        });
    }

    if src.width == src.height {
        return Ok(Size::new(max_side, max_side));
    }

    if src.width > src.height {
        let height = scaled_side(src.height, max_side, src.width);
        return Ok(Size::new(max_side, height));
    }

    let width = scaled_side(src.width, max_side, src.height);
    Ok(Size::new(width, max_side))
}

fn scaled_side(side: u32, max_side: u32, longest: u32) -> u32 {
    let scaled = (f64::from(side) * f64::from(max_side) / f64::from(longest)) as u32;
    scaled.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_maps_width_to_max_side() {
        let size = scale_to_fit(Size::new(1000, 500), 512).unwrap();
        assert_eq!(size, Size::new(512, 256));
    }

    #[test]
    fn test_portrait_maps_height_to_max_side() {
        let size = scale_to_fit(Size::new(720, 1280), 512).unwrap();
        assert_eq!(size.height, 512);
        assert_eq!(size.width, 288);
    }

    #[test]
    fn test_square_is_exact() {
        assert_eq!(
            scale_to_fit(Size::new(77, 77), 512).unwrap(),
            Size::new(512, 512)
        );
    }

    #[test]
    fn test_upscales_small_sources() {
        let size = scale_to_fit(Size::new(100, 50), 512).unwrap();
        assert_eq!(size, Size::new(512, 256));
    }

    #[test]
    fn test_extreme_aspect_ratio_keeps_one_pixel() {
        let size = scale_to_fit(Size::new(10_000, 1), 512).unwrap();
        assert_eq!(size, Size::new(512, 1));
    }

    #[test]
    fn test_aspect_ratio_within_rounding() {
        for (w, h) in [(1920, 1080), (640, 480), (333, 999), (513, 512), (1, 3)] {
            let size = scale_to_fit(Size::new(w, h), 512).unwrap();
            assert_eq!(size.width.max(size.height), 512);
            let src_ratio = f64::from(w) / f64::from(h);
            // one pixel of truncation on the short side
            let lo = f64::from(size.width) / f64::from(size.height + 1);
            let hi = f64::from(size.width + 1) / f64::from(size.height.max(1));
            assert!(
                src_ratio >= lo - 1e-9 && src_ratio <= hi + 1e-9,
                "{}x{} -> {:?}",
                w,
                h,
                size
            );
        }
    }

    #[test]
    fn test_zero_dimensions_fail() {
        assert_eq!(
            scale_to_fit(Size::new(0, 100), 512),
            Err(GeometryError {
                width: 0,
                height: 100
            })
        );
        assert!(scale_to_fit(Size::new(100, 0), 512).is_err());
        assert!(scale_to_fit(Size::new(0, 0), 512).is_err());
    }
}
