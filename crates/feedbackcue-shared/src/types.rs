use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// FeedbackStatus
// ---------------------------------------------------------------------------

/// Triage state of a feedback item. Any state may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    #[default]
    Open,
    UnderReview,
    Planned,
    InProgress,
    Shipped,
    Closed,
}

impl FeedbackStatus {
    pub const ALL: [FeedbackStatus; 6] = [
        Self::Open,
        Self::UnderReview,
        Self::Planned,
        Self::InProgress,
        Self::Shipped,
        Self::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::UnderReview => "under_review",
            Self::Planned => "planned",
            Self::InProgress => "in_progress",
            Self::Shipped => "shipped",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for FeedbackStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownStatus(s.to_string()))
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FeedbackCategory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    Bug,
    #[default]
    Feature,
    Improvement,
    Question,
}

impl FeedbackCategory {
    pub const ALL: [FeedbackCategory; 4] =
        [Self::Bug, Self::Feature, Self::Improvement, Self::Question];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::Improvement => "improvement",
            Self::Question => "question",
        }
    }
}

impl FromStr for FeedbackCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SortKey
// ---------------------------------------------------------------------------

/// Ordering applied when listing a board's feedback.
///
/// Parsing is total: anything other than `newest` or `oldest` means
/// [`SortKey::Votes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Votes,
    Newest,
    Oldest,
}

impl SortKey {
    pub fn parse(s: &str) -> Self {
        match s {
            "newest" => Self::Newest,
            "oldest" => Self::Oldest,
            _ => Self::Votes,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Votes => "votes",
            Self::Newest => "newest",
            Self::Oldest => "oldest",
        }
    }
}

impl From<&str> for SortKey {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

// ---------------------------------------------------------------------------
// VoteOutcome
// ---------------------------------------------------------------------------

/// What a vote toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteOutcome {
    Added,
    Removed,
}

impl VoteOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added)
    }
}
