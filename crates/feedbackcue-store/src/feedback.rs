//! Feedback items: submission, triage and the filtered listing.

use rusqlite::params;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use feedbackcue_shared::constants::{ANONYMOUS_AUTHOR, MAX_AUTHOR_NAME_LEN, MAX_TITLE_LEN};
use feedbackcue_shared::{validate, FeedbackCategory, FeedbackStatus, SortKey, ValidationError};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{FeedbackItem, NewFeedback};
use crate::row;

const ITEM_COLUMNS: &str = "id, board_id, title, description, status, category, vote_count, \
                            author_email, author_name, created_at, updated_at";

/// Filter and ordering for [`Database::list_items`]. Filters are
/// conjunctive; `None` matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackFilter {
    pub status: Option<FeedbackStatus>,
    pub category: Option<FeedbackCategory>,
    #[serde(default)]
    pub sort: SortKey,
}

impl FeedbackFilter {
    /// Build a filter from raw query-string values. Blank values mean "no
    /// filter"; unrecognized status or category names are rejected.
    pub fn parse(
        status: Option<&str>,
        category: Option<&str>,
        sort: Option<&str>,
    ) -> std::result::Result<Self, ValidationError> {
        let status = validate::optional_text(status)
            .map(|s| s.parse::<FeedbackStatus>())
            .transpose()?;
        let category = validate::optional_text(category)
            .map(|c| c.parse::<FeedbackCategory>())
            .transpose()?;
        let sort = sort.map(SortKey::parse).unwrap_or_default();

        Ok(Self { status, category, sort })
    }

    fn order_by(&self) -> &'static str {
        // rowid is insertion order and only breaks exact timestamp ties.
        match self.sort {
            SortKey::Newest => "created_at DESC, rowid DESC",
            SortKey::Oldest => "created_at ASC, rowid ASC",
            SortKey::Votes => "vote_count DESC, created_at DESC, rowid DESC",
        }
    }
}

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Submit feedback to a board. Anyone may do this; a blank author name
    /// is recorded as "Anonymous".
    pub fn create_feedback(&self, board_id: Uuid, new: &NewFeedback) -> Result<FeedbackItem> {
        let title = validate::required_text("Title", &new.title, MAX_TITLE_LEN)?;
        let author_name = match validate::optional_text(new.author_name.as_deref()) {
            Some(name) if name.chars().count() > MAX_AUTHOR_NAME_LEN => {
                return Err(ValidationError::TooLong {
                    field: "Author name",
                    max: MAX_AUTHOR_NAME_LEN,
                }
                .into());
            }
            Some(name) => name,
            None => ANONYMOUS_AUTHOR.to_string(),
        };

        // Fail with NotFound rather than a foreign-key error.
        self.get_board(board_id)?;

        let now = row::now();
        let item = FeedbackItem {
            id: Uuid::new_v4(),
            board_id,
            title,
            description: new.description.trim().to_string(),
            status: FeedbackStatus::default(),
            category: new.category,
            vote_count: 0,
            author_email: validate::optional_text(new.author_email.as_deref()),
            author_name,
            created_at: now,
            updated_at: now,
        };

        self.conn().execute(
            "INSERT INTO feedback_items (id, board_id, title, description, status, category,
                                         vote_count, author_email, author_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                item.id.to_string(),
                item.board_id.to_string(),
                item.title,
                item.description,
                item.status.as_str(),
                item.category.as_str(),
                item.vote_count,
                item.author_email,
                item.author_name,
                row::timestamp(&item.created_at),
                row::timestamp(&item.updated_at),
            ],
        )?;

        tracing::info!(item_id = %item.id, board_id = %board_id, category = %item.category, "feedback submitted");
        Ok(item)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn get_feedback(&self, id: Uuid) -> Result<FeedbackItem> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM feedback_items WHERE id = ?1");
        Ok(self
            .conn()
            .query_row(&sql, params![id.to_string()], row_to_item)?)
    }

    /// Fetch an item only if it belongs to `board_id`.
    pub fn get_board_feedback(&self, board_id: Uuid, id: Uuid) -> Result<FeedbackItem> {
        let item = self.get_feedback(id)?;
        if item.board_id != board_id {
            return Err(StoreError::NotFound);
        }
        Ok(item)
    }

    /// List a board's feedback, filtered and ordered by `filter`.
    ///
    /// * `Newest` -- creation time descending
    /// * `Oldest` -- creation time ascending
    /// * `Votes`  -- vote count descending, then creation time descending
    pub fn list_items(&self, board_id: Uuid, filter: &FeedbackFilter) -> Result<Vec<FeedbackItem>> {
        let mut sql = format!("SELECT {ITEM_COLUMNS} FROM feedback_items WHERE board_id = ?");
        let mut args: Vec<Value> = vec![Value::Text(board_id.to_string())];

        if let Some(status) = filter.status {
            sql.push_str(" AND status = ?");
            args.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(category) = filter.category {
            sql.push_str(" AND category = ?");
            args.push(Value::Text(category.as_str().to_string()));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(filter.order_by());

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args), row_to_item)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }

        tracing::debug!(board_id = %board_id, ?filter, count = items.len(), "listed feedback");
        Ok(items)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    pub fn update_feedback_status(&self, id: Uuid, status: FeedbackStatus) -> Result<FeedbackItem> {
        let affected = self.conn().execute(
            "UPDATE feedback_items SET status = ?2, updated_at = ?3 WHERE id = ?1",
            params![id.to_string(), status.as_str(), row::timestamp(&row::now())],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::info!(item_id = %id, %status, "feedback status changed");
        self.get_feedback(id)
    }
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<FeedbackItem> {
    Ok(FeedbackItem {
        id: row::uuid(row, 0)?,
        board_id: row::uuid(row, 1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: row::parsed(row, 4)?,
        category: row::parsed(row, 5)?,
        vote_count: row.get(6)?,
        author_email: row.get(7)?,
        author_name: row.get(8)?,
        created_at: row::datetime(row, 9)?,
        updated_at: row::datetime(row, 10)?,
    })
}
