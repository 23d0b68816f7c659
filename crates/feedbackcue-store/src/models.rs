//! Domain model structs persisted in the SQLite database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use feedbackcue_shared::{FeedbackCategory, FeedbackStatus};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered board owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// A named collection of feedback items with one owner and a unique slug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    pub id: Uuid,
    /// Owning user. Fixed at creation.
    pub owner_id: Uuid,
    pub name: String,
    /// Public URL identifier, unique across all boards.
    pub slug: String,
    pub description: String,
    /// `#RRGGBB`
    pub accent_color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for [`Database::create_board`](crate::Database::create_board).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBoard {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub accent_color: Option<String>,
}

/// Partial update for [`Database::update_board`](crate::Database::update_board).
/// `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub accent_color: Option<String>,
    /// Desired slug text; re-normalized and de-duplicated. Blank is ignored.
    pub slug: Option<String>,
}

/// Aggregate counts shown on the owner dashboard.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardStats {
    pub item_count: i64,
    pub total_votes: i64,
    pub open_count: i64,
}

// ---------------------------------------------------------------------------
// FeedbackItem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackItem {
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: FeedbackStatus,
    pub category: FeedbackCategory,
    /// Number of live votes; maintained by the vote ledger.
    pub vote_count: i64,
    pub author_email: Option<String>,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for [`Database::create_feedback`](crate::Database::create_feedback).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewFeedback {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: FeedbackCategory,
    #[serde(default)]
    pub author_email: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Vote
// ---------------------------------------------------------------------------

/// One voter's vote on one item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    pub id: Uuid,
    pub feedback_item_id: Uuid,
    /// Opaque voter identifier: anonymous cookie value or user id.
    pub voter_id: String,
    pub voter_email: Option<String>,
    pub created_at: DateTime<Utc>,
}
