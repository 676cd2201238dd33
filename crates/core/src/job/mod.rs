//! Jobs: one source file, its category and where its output goes.

mod selection;

pub use selection::{
    ExpandResult, SelectionError, SelectionExpander, SelectionItem, DEFAULT_OUTPUT_DIR,
};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::InputKind;

/// One source file to convert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub input_path: PathBuf,
    pub kind: InputKind,
    /// Destination directory; empty means next to the input.
    pub output_dir: PathBuf,
}

impl Job {
    pub fn new(input_path: impl Into<PathBuf>, kind: InputKind) -> Self {
        Self {
            input_path: input_path.into(),
            kind,
            output_dir: PathBuf::new(),
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Where an artifact named `<stem><suffix>` lands for this job.
    pub fn output_path(&self, suffix: &str) -> PathBuf {
        let stem = self
            .input_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let name = format!("{}{}", stem, suffix);

        if self.output_dir.as_os_str().is_empty() {
            let parent = self.input_path.parent().unwrap_or_else(|| Path::new(""));
            parent.join(name)
        } else {
            self.output_dir.join(name)
        }
    }
}

/// A path that was not turned into a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

/// Classifies plain paths into jobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobPlanner;

impl JobPlanner {
    /// Plans one job per supported path; the rest are reported as skipped.
    /// Planned jobs have no output directory.
    pub fn plan<I, P>(&self, paths: I) -> (Vec<Job>, Vec<Skipped>)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut jobs = Vec::new();
        let mut skipped = Vec::new();

        for path in paths {
            let path = path.as_ref();
            match InputKind::detect(path) {
                Ok(kind) => jobs.push(Job::new(path, kind)),
                Err(e) => skipped.push(Skipped {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }),
            }
        }

        (jobs, skipped)
    }
}
