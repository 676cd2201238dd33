//! Output targets and how a selection fits them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::InputKind;
use crate::job::Job;
use crate::pipeline::ImageTarget;
use crate::task::TaskType;

/// What the user wants to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    VideoSticker,
    StaticSticker,
    Emoji,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown target '{0}' (expected video_sticker, static_sticker or emoji)")]
pub struct UnknownTargetError(pub String);

impl TargetType {
    pub const ALL: [TargetType; 3] = [Self::VideoSticker, Self::StaticSticker, Self::Emoji];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VideoSticker => "video_sticker",
            Self::StaticSticker => "static_sticker",
            Self::Emoji => "emoji",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::VideoSticker => "Video Sticker",
            Self::StaticSticker => "Static Sticker",
            Self::Emoji => "Emoji",
        }
    }

    pub fn task_type(&self) -> TaskType {
        match self {
            Self::VideoSticker => TaskType::VideoSticker,
            Self::StaticSticker => TaskType::StaticSticker,
            Self::Emoji => TaskType::Emoji,
        }
    }

    /// The still-image flavour, for image targets.
    pub fn image_target(&self) -> Option<ImageTarget> {
        match self {
            Self::VideoSticker => None,
            Self::StaticSticker => Some(ImageTarget::StaticSticker),
            Self::Emoji => Some(ImageTarget::Emoji),
        }
    }

    pub fn accepts(&self, kind: InputKind) -> bool {
        match self {
            Self::VideoSticker => matches!(kind, InputKind::Video | InputKind::Gif),
            Self::StaticSticker | Self::Emoji => kind == InputKind::Image,
        }
    }

    fn allowed_count(&self, summary: &InputSummary) -> usize {
        match self {
            Self::VideoSticker => summary.video + summary.gif,
            Self::StaticSticker | Self::Emoji => summary.image,
        }
    }

    fn blocked_message(&self) -> &'static str {
        match self {
            Self::VideoSticker => "Must select videos or GIFs for this target",
            Self::StaticSticker | Self::Emoji => "Must select images for this target",
        }
    }

    fn warning_message(&self) -> &'static str {
        match self {
            Self::VideoSticker => "Only videos or GIFs will be processed",
            Self::StaticSticker | Self::Emoji => "Only images will be processed",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = UnknownTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| UnknownTargetError(s.to_string()))
    }
}

/// Counts of a job list by input category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSummary {
    pub total: usize,
    pub image: usize,
    pub gif: usize,
    pub video: usize,
}

impl InputSummary {
    pub fn from_jobs(jobs: &[Job]) -> Self {
        let mut summary = Self::default();
        for job in jobs {
            summary.total += 1;
            match job.kind {
                InputKind::Image => summary.image += 1,
                InputKind::Gif => summary.gif += 1,
                InputKind::Video => summary.video += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    Ok,
    Warning,
    Blocked,
}

/// Whether a selection can be converted to a target, and what to tell the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetHint {
    pub status: TargetStatus,
    /// Empty when the status is `Ok`.
    pub message: String,
}

/// Judges a selection summary against a target.
pub fn evaluate_target(summary: &InputSummary, target: TargetType) -> TargetHint {
    if summary.total == 0 {
        return TargetHint {
            status: TargetStatus::Blocked,
            message: "No selection".to_string(),
        };
    }

    let allowed = target.allowed_count(summary);
    if allowed == 0 {
        return TargetHint {
            status: TargetStatus::Blocked,
            message: target.blocked_message().to_string(),
        };
    }
    if allowed < summary.total {
        return TargetHint {
            status: TargetStatus::Warning,
            message: target.warning_message().to_string(),
        };
    }

    TargetHint {
        status: TargetStatus::Ok,
        message: String::new(),
    }
}

/// Keeps the jobs whose input category the target accepts, in order.
pub fn filter_jobs_for_target(jobs: Vec<Job>, target: TargetType) -> Vec<Job> {
    jobs.into_iter().filter(|j| target.accepts(j.kind)).collect()
}
