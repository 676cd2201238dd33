use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::encoder::EncoderConfig;
use crate::job::DEFAULT_OUTPUT_DIR;
use crate::task::ExecutorConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub encoder: EncoderConfig,

    #[serde(default)]
    pub executor: ExecutorConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Where produced artifacts go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory; empty writes each artifact next to its input.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}
