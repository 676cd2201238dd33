//! Option types passed to the encoder.

use serde::{Deserialize, Serialize};

/// Options for a video/animated encode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeOptions {
    /// Trims the filtered stream to this many seconds; 0 disables trimming.
    pub trim_secs: u32,
}

/// Options for a still-image encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEncodeOptions {
    /// Box the image is fitted into.
    pub target_side: u32,
    /// Pads the fitted image with transparency to `target_side` x `target_side`.
    pub pad_to_square: bool,
}
