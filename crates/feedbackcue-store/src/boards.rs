//! Board CRUD and slug reservation.
//!
//! Slugs are unique across all boards. [`Database::reserve_slug`] finds the
//! first free candidate (`base`, `base-1`, `base-2`, ...) against the
//! current table contents; create and update repeat that search inside the
//! same transaction as their write, and retry once if the UNIQUE index on
//! `boards.slug` still rejects the row.

use rusqlite::{params, Connection, TransactionBehavior};
use uuid::Uuid;

use feedbackcue_shared::constants::{DEFAULT_ACCENT_COLOR, MAX_BOARD_NAME_LEN};
use feedbackcue_shared::{slug, validate, FeedbackStatus};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{Board, BoardStats, BoardUpdate, NewBoard};
use crate::row;

const BOARD_COLUMNS: &str =
    "id, owner_id, name, slug, description, accent_color, created_at, updated_at";

impl Database {
    // ------------------------------------------------------------------
    // Slugs
    // ------------------------------------------------------------------

    /// Return a slug derived from `name` that no board other than
    /// `exclude_id` currently uses. Nothing is written.
    pub fn reserve_slug(&self, name: &str, exclude_id: Option<Uuid>) -> Result<String> {
        find_free_slug(self.conn(), name, exclude_id)
    }

    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    pub fn create_board(&mut self, owner_id: Uuid, new: &NewBoard) -> Result<Board> {
        let name = validate::required_text("Board name", &new.name, MAX_BOARD_NAME_LEN)?;
        let accent_color = match validate::optional_text(new.accent_color.as_deref()) {
            Some(color) => validate::accent_color(&color)?,
            None => DEFAULT_ACCENT_COLOR.to_string(),
        };
        let description = new.description.trim().to_string();

        let board = retry_slug_conflict(|| {
            let tx = self
                .conn_mut()
                .transaction_with_behavior(TransactionBehavior::Immediate)?;

            let now = row::now();
            let board = Board {
                id: Uuid::new_v4(),
                owner_id,
                name: name.clone(),
                slug: find_free_slug(&tx, &name, None)?,
                description: description.clone(),
                accent_color: accent_color.clone(),
                created_at: now,
                updated_at: now,
            };

            tx.execute(
                "INSERT INTO boards (id, owner_id, name, slug, description, accent_color, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    board.id.to_string(),
                    board.owner_id.to_string(),
                    board.name,
                    board.slug,
                    board.description,
                    board.accent_color,
                    row::timestamp(&board.created_at),
                    row::timestamp(&board.updated_at),
                ],
            )?;
            tx.commit()?;
            Ok(board)
        })?;

        tracing::info!(board_id = %board.id, slug = %board.slug, owner_id = %owner_id, "board created");
        Ok(board)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn get_board(&self, id: Uuid) -> Result<Board> {
        let sql = format!("SELECT {BOARD_COLUMNS} FROM boards WHERE id = ?1");
        Ok(self
            .conn()
            .query_row(&sql, params![id.to_string()], row_to_board)?)
    }

    pub fn get_board_by_slug(&self, slug: &str) -> Result<Board> {
        let sql = format!("SELECT {BOARD_COLUMNS} FROM boards WHERE slug = ?1");
        Ok(self.conn().query_row(&sql, params![slug], row_to_board)?)
    }

    /// Fetch a board only if `owner_id` owns it. Someone else's board is
    /// reported as `NotFound`.
    pub fn get_owned_board(&self, id: Uuid, owner_id: Uuid) -> Result<Board> {
        let board = self.get_board(id)?;
        if board.owner_id != owner_id {
            return Err(StoreError::NotFound);
        }
        Ok(board)
    }

    /// Boards owned by `owner_id`, newest first.
    pub fn list_boards_for_owner(&self, owner_id: Uuid) -> Result<Vec<Board>> {
        let sql = format!(
            "SELECT {BOARD_COLUMNS} FROM boards WHERE owner_id = ?1
             ORDER BY created_at DESC, rowid DESC"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params![owner_id.to_string()], row_to_board)?;

        let mut boards = Vec::new();
        for row in rows {
            boards.push(row?);
        }
        Ok(boards)
    }

    pub fn board_stats(&self, board_id: Uuid) -> Result<BoardStats> {
        Ok(self.conn().query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(vote_count), 0),
                    COALESCE(SUM(CASE WHEN status = ?2 THEN 1 ELSE 0 END), 0)
             FROM feedback_items WHERE board_id = ?1",
            params![board_id.to_string(), FeedbackStatus::Open.as_str()],
            |r| {
                Ok(BoardStats {
                    item_count: r.get(0)?,
                    total_votes: r.get(1)?,
                    open_count: r.get(2)?,
                })
            },
        )?)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Apply a partial update. A non-blank `slug` is normalized and
    /// de-duplicated against every other board; the board keeps its current
    /// slug otherwise.
    pub fn update_board(&mut self, id: Uuid, update: &BoardUpdate) -> Result<Board> {
        let mut board = self.get_board(id)?;

        if let Some(name) = &update.name {
            board.name = validate::required_text("Board name", name, MAX_BOARD_NAME_LEN)?;
        }
        if let Some(description) = &update.description {
            board.description = description.trim().to_string();
        }
        if let Some(color) = &update.accent_color {
            board.accent_color = validate::accent_color(color)?;
        }
        let requested_slug = validate::optional_text(update.slug.as_deref());

        let board = retry_slug_conflict(|| {
            let tx = self
                .conn_mut()
                .transaction_with_behavior(TransactionBehavior::Immediate)?;

            let mut board = board.clone();
            if let Some(requested) = &requested_slug {
                board.slug = find_free_slug(&tx, requested, Some(board.id))?;
            }
            board.updated_at = row::now();

            let affected = tx.execute(
                "UPDATE boards
                 SET name = ?2, slug = ?3, description = ?4, accent_color = ?5, updated_at = ?6
                 WHERE id = ?1",
                params![
                    board.id.to_string(),
                    board.name,
                    board.slug,
                    board.description,
                    board.accent_color,
                    row::timestamp(&board.updated_at),
                ],
            )?;
            if affected == 0 {
                return Err(StoreError::NotFound);
            }
            tx.commit()?;
            Ok(board)
        })?;

        tracing::info!(board_id = %board.id, slug = %board.slug, "board updated");
        Ok(board)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    // ON DELETE CASCADE: feedback items and their votes go with it
    pub fn delete_board(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM boards WHERE id = ?1", params![id.to_string()])?;
        if affected > 0 {
            tracing::info!(board_id = %id, "board deleted");
        }
        Ok(affected > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn find_free_slug(conn: &Connection, name: &str, exclude_id: Option<Uuid>) -> Result<String> {
    let base = slug::base_slug(name);
    let exclude = exclude_id.map(|id| id.to_string());

    let mut stmt = conn.prepare_cached(
        "SELECT EXISTS(SELECT 1 FROM boards WHERE slug = ?1 AND (?2 IS NULL OR id != ?2))",
    )?;

    let mut candidate = base.clone();
    let mut suffix = 0u64;
    while stmt.query_row(params![candidate, exclude], |r| r.get::<_, bool>(0))? {
        suffix += 1;
        candidate = slug::with_suffix(&base, suffix);
    }
    Ok(candidate)
}

/// Run `op`, and run it once more if it fails on a uniqueness conflict. The
/// second attempt searches from the freshly committed state, so it picks a
/// different suffix.
fn retry_slug_conflict<T>(mut op: impl FnMut() -> Result<T>) -> Result<T> {
    match op() {
        Err(StoreError::Conflict(reason)) => {
            tracing::warn!(%reason, "slug taken concurrently, retrying reservation");
            op()
        }
        other => other,
    }
}

fn row_to_board(row: &rusqlite::Row<'_>) -> rusqlite::Result<Board> {
    Ok(Board {
        id: row::uuid(row, 0)?,
        owner_id: row::uuid(row, 1)?,
        name: row.get(2)?,
        slug: row.get(3)?,
        description: row.get(4)?,
        accent_color: row.get(5)?,
        created_at: row::datetime(row, 6)?,
        updated_at: row::datetime(row, 7)?,
    })
}
