//! Login sessions.
//!
//! Only a hash of the bearer token reaches the database; hashing happens in
//! the server so the store never sees raw tokens.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::database::Database;
use crate::error::Result;
use crate::models::User;
use crate::row;

impl Database {
    pub fn create_session(
        &self,
        token_hash: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.conn().execute(
            "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                token_hash,
                user_id.to_string(),
                row::timestamp(&row::now()),
                row::timestamp(&expires_at),
            ],
        )?;
        Ok(())
    }

    /// Resolve a session to its user. Expired sessions are deleted and
    /// treated as absent.
    pub fn get_session_user(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<User>> {
        let found: Option<(Uuid, DateTime<Utc>)> = self
            .conn()
            .query_row(
                "SELECT user_id, expires_at FROM sessions WHERE token_hash = ?1",
                params![token_hash],
                |r| Ok((row::uuid(r, 0)?, row::datetime(r, 1)?)),
            )
            .optional()?;

        let Some((user_id, expires_at)) = found else {
            return Ok(None);
        };

        if expires_at <= now {
            tracing::debug!(user_id = %user_id, "session expired");
            self.delete_session(token_hash)?;
            return Ok(None);
        }

        self.get_user(user_id).map(Some)
    }

    pub fn delete_session(&self, token_hash: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM sessions WHERE token_hash = ?1", params![token_hash])?;
        Ok(affected > 0)
    }

    /// Drop every session that has expired by `now`. Returns the number removed.
    pub fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
        let removed = self.conn().execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            params![row::timestamp(&now)],
        )?;
        Ok(removed)
    }
}
