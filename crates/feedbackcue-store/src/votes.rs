//! The vote ledger.
//!
//! A voter holds at most one vote per feedback item, and
//! `feedback_items.vote_count` always equals the number of vote rows for the
//! item. [`Database::toggle_vote`] changes the vote row and the counter in
//! one `BEGIN IMMEDIATE` transaction, so readers never see one without the
//! other. The UNIQUE index on `(feedback_item_id, voter_id)` backs this up
//! when several connections write to the same file.

use std::collections::HashSet;

use rusqlite::{params, Connection, TransactionBehavior};
use uuid::Uuid;

use feedbackcue_shared::VoteOutcome;

use crate::database::Database;
use crate::error::{is_unique_violation, Result, StoreError};
use crate::models::Vote;
use crate::row;

impl Database {
    /// Flip `voter_id`'s vote on an item.
    ///
    /// Adds a vote (and increments the counter) when the voter has none,
    /// removes it (and decrements, never below zero) when they do. Calling
    /// it twice restores the original state.
    ///
    /// Fails with `NotFound` when the item does not exist. Callers that care
    /// which board the item belongs to must check that first.
    pub fn toggle_vote(
        &mut self,
        item_id: Uuid,
        voter_id: &str,
        voter_email: Option<&str>,
    ) -> Result<VoteOutcome> {
        let item_key = item_id.to_string();
        let now = row::timestamp(&row::now());

        let tx = self
            .conn_mut()
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM feedback_items WHERE id = ?1)",
            params![item_key],
            |r| r.get(0),
        )?;
        if !exists {
            return Err(StoreError::NotFound);
        }

        let removed = tx.execute(
            "DELETE FROM votes WHERE feedback_item_id = ?1 AND voter_id = ?2",
            params![item_key, voter_id],
        )?;

        let outcome = if removed > 0 {
            tx.execute(
                "UPDATE feedback_items SET vote_count = MAX(vote_count - 1, 0), updated_at = ?2
                 WHERE id = ?1",
                params![item_key, now],
            )?;
            VoteOutcome::Removed
        } else {
            if !insert_vote(&tx, &item_key, voter_id, voter_email, &now)? {
                // Another writer recorded this voter's vote first. Their
                // transaction already counted it; leave everything as is.
                tracing::debug!(item_id = %item_id, voter_id, "concurrent duplicate vote collapsed");
                return Ok(VoteOutcome::Added);
            }
            tx.execute(
                "UPDATE feedback_items SET vote_count = vote_count + 1, updated_at = ?2
                 WHERE id = ?1",
                params![item_key, now],
            )?;
            VoteOutcome::Added
        };

        tx.commit()?;

        tracing::info!(item_id = %item_id, voter_id, ?outcome, "vote toggled");
        Ok(outcome)
    }

    /// Whether `voter_id` currently holds a vote on the item. Pure read.
    pub fn has_voted(&self, item_id: Uuid, voter_id: &str) -> Result<bool> {
        Ok(self.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM votes WHERE feedback_item_id = ?1 AND voter_id = ?2)",
            params![item_id.to_string(), voter_id],
            |r| r.get(0),
        )?)
    }

    /// Ids of every item on `board_id` that `voter_id` has voted on.
    pub fn voted_item_ids(&self, board_id: Uuid, voter_id: &str) -> Result<HashSet<Uuid>> {
        let mut stmt = self.conn().prepare(
            "SELECT v.feedback_item_id
             FROM votes v
             JOIN feedback_items f ON f.id = v.feedback_item_id
             WHERE f.board_id = ?1 AND v.voter_id = ?2",
        )?;
        let rows = stmt.query_map(params![board_id.to_string(), voter_id], |r| row::uuid(r, 0))?;

        let mut ids = HashSet::new();
        for row in rows {
            ids.insert(row?);
        }
        Ok(ids)
    }

    /// Live votes on an item, oldest first.
    pub fn list_votes(&self, item_id: Uuid) -> Result<Vec<Vote>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, feedback_item_id, voter_id, voter_email, created_at
             FROM votes WHERE feedback_item_id = ?1
             ORDER BY created_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map(params![item_id.to_string()], |r| {
            Ok(Vote {
                id: row::uuid(r, 0)?,
                feedback_item_id: row::uuid(r, 1)?,
                voter_id: r.get(2)?,
                voter_email: r.get(3)?,
                created_at: row::datetime(r, 4)?,
            })
        })?;

        let mut votes = Vec::new();
        for row in rows {
            votes.push(row?);
        }
        Ok(votes)
    }
}

/// Insert one vote row. `Ok(false)` means the voter already holds a vote on
/// the item and nothing was written.
fn insert_vote(
    conn: &Connection,
    item_key: &str,
    voter_id: &str,
    voter_email: Option<&str>,
    now: &str,
) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT INTO votes (id, feedback_item_id, voter_id, voter_email, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![Uuid::new_v4().to_string(), item_key, voter_id, voter_email, now],
    );
    match inserted {
        Ok(_) => Ok(true),
        Err(e) if is_unique_violation(&e) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
