//! Expands user selections (files and directories) into jobs.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use super::{Job, Skipped};
use crate::domain::InputKind;

/// Output directory used when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Errors raised while expanding a selection.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// A selected directory (or something under it) could not be read.
    #[error("failed to read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A selected path does not exist.
    #[error("failed to read {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One user-selected path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    pub path: PathBuf,
    pub is_dir: bool,
}

impl SelectionItem {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
        }
    }

    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
        }
    }

    /// Builds an item by asking the filesystem whether `path` is a directory.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, SelectionError> {
        let path = path.into();
        let metadata = std::fs::metadata(&path).map_err(|source| SelectionError::Stat {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            is_dir: metadata.is_dir(),
            path,
        })
    }
}

/// Jobs and bookkeeping produced by [`SelectionExpander::expand`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandResult {
    pub jobs: Vec<Job>,
    /// Directories walked.
    pub dir_count: usize,
    /// Explicitly selected files that became jobs.
    pub file_count: usize,
    /// All files that became jobs.
    pub total_files: usize,
    /// Distinct output directories, sorted.
    pub output_dirs: Vec<PathBuf>,
    pub skipped: Vec<Skipped>,
}

/// Turns a mixed selection into a de-duplicated job list.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionExpander {
    follow_links: bool,
}

impl SelectionExpander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow symlinks while walking directories.
    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Expands `selections` into jobs writing to `output_dir`.
    ///
    /// Explicit files are handled before directories. Directories are walked
    /// recursively in file-name order. A path already seen is dropped, so a
    /// file selected explicitly and found again under a directory yields one job.
    pub fn expand(
        &self,
        selections: &[SelectionItem],
        output_dir: &Path,
    ) -> Result<ExpandResult, SelectionError> {
        let output_dir = if output_dir.as_os_str().is_empty() {
            PathBuf::from(DEFAULT_OUTPUT_DIR)
        } else {
            output_dir.to_path_buf()
        };

        let mut result = ExpandResult::default();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut outputs: BTreeSet<PathBuf> = BTreeSet::new();

        for item in selections.iter().filter(|s| !s.is_dir) {
            if self.accept(&item.path, &output_dir, &mut seen, &mut result) {
                result.file_count += 1;
                result.total_files += 1;
                outputs.insert(output_dir.clone());
            }
        }

        for item in selections.iter().filter(|s| s.is_dir) {
            let files = self.list_files(&item.path)?;
            result.dir_count += 1;
            debug!(dir = %item.path.display(), files = files.len(), "Expanded directory");

            for path in files {
                if self.accept(&path, &output_dir, &mut seen, &mut result) {
                    result.total_files += 1;
                    outputs.insert(output_dir.clone());
                }
            }
        }

        result.output_dirs = outputs.into_iter().collect();
        Ok(result)
    }

    /// Records `path` as a job or a skip. Returns true when a job was added.
    fn accept(
        &self,
        path: &Path,
        output_dir: &Path,
        seen: &mut HashSet<PathBuf>,
        result: &mut ExpandResult,
    ) -> bool {
        let kind = match InputKind::detect(path) {
            Ok(kind) => kind,
            Err(e) => {
                result.skipped.push(Skipped {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
                return false;
            }
        };

        if !seen.insert(path.to_path_buf()) {
            return false;
        }

        result
            .jobs
            .push(Job::new(path, kind).with_output_dir(output_dir));
        true
    }

    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>, SelectionError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root)
            .follow_links(self.follow_links)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| SelectionError::ReadDir {
                path: root.to_path_buf(),
                source,
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}
