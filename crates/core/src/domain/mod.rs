//! Pure sticker-domain logic: limits, the attempt ladder and output validation.
//!
//! Nothing in here touches the filesystem or spawns processes.

mod constraints;
mod ladder;
mod media;
mod validator;

pub use constraints::{
    scale_to_fit, GeometryError, Size, DEFAULT_IMAGE_DURATION_SECS, DEFAULT_IMAGE_FPS,
    EMOJI_SIDE, MAX_STICKER_DURATION_SECS, MAX_STICKER_FPS, MAX_STICKER_SIDE,
    MAX_STICKER_SIZE_BYTES, MIN_BITRATE_KBPS, STATIC_STICKER_SIDE,
};
pub use ladder::{base_bitrate_kbps, build_attempts, EncodeAttempt};
pub use media::{ImageInfo, InputKind, InputKindError, MediaInfo};
pub use validator::{
    validate_emoji_image, validate_output, validate_static_sticker_image, IssueCode,
    ValidationIssue,
};
