use super::{types::Config, ConfigError};
use crate::encoder::FFMPEG_LOG_LEVELS;

/// Validate configuration
/// Currently validates:
/// - Work queue capacity is not 0
/// - ffmpeg/ffprobe paths are not empty
/// - ffmpeg log level is one ffmpeg understands
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.executor.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "executor.queue_capacity cannot be 0".to_string(),
        ));
    }

    if config.encoder.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "encoder.ffmpeg_path cannot be empty".to_string(),
        ));
    }

    if config.encoder.ffprobe_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "encoder.ffprobe_path cannot be empty".to_string(),
        ));
    }

    if !FFMPEG_LOG_LEVELS.contains(&config.encoder.ffmpeg_log_level.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "encoder.ffmpeg_log_level '{}' is not one of: {}",
            config.encoder.ffmpeg_log_level,
            FFMPEG_LOG_LEVELS.join(", ")
        )));
    }

    Ok(())
}
