//! CRUD operations for [`User`] records.

use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use feedbackcue_shared::validate;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::User;
use crate::row;

const USER_COLUMNS: &str = "id, email, username, password_hash, created_at";

impl Database {
    /// Register a user. `password_hash` must already be hashed.
    ///
    /// Fails with `Conflict` when the email or username is taken.
    pub fn create_user(&self, email: &str, username: &str, password_hash: &str) -> Result<User> {
        let email = validate::required_text("Email", email, 255)?;
        let username = validate::required_text("Username", username, 100)?;

        if self.get_user_by_email(&email)?.is_some() {
            return Err(StoreError::Conflict("Email already registered".into()));
        }
        if self.get_user_by_username(&username)?.is_some() {
            return Err(StoreError::Conflict("Username already taken".into()));
        }

        let user = User {
            id: Uuid::new_v4(),
            email,
            username,
            password_hash: password_hash.to_string(),
            created_at: row::now(),
        };

        self.conn().execute(
            "INSERT INTO users (id, email, username, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.email,
                user.username,
                user.password_hash,
                row::timestamp(&user.created_at),
            ],
        )?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    pub fn get_user(&self, id: Uuid) -> Result<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        Ok(self
            .conn()
            .query_row(&sql, params![id.to_string()], row_to_user)?)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
        Ok(self
            .conn()
            .query_row(&sql, params![email], row_to_user)
            .optional()?)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");
        Ok(self
            .conn()
            .query_row(&sql, params![username], row_to_user)
            .optional()?)
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row::uuid(row, 0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row::datetime(row, 4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_fetch() {
        let db = Database::open_in_memory().unwrap();
        let user = db.create_user(" owner@test.com ", "owner", "hash").unwrap();
        assert_eq!(user.email, "owner@test.com");

        assert_eq!(db.get_user(user.id).unwrap(), user);
        assert_eq!(db.get_user_by_email("owner@test.com").unwrap(), Some(user.clone()));
        assert_eq!(db.get_user_by_username("owner").unwrap(), Some(user));
        assert_eq!(db.get_user_by_email("nobody@test.com").unwrap(), None);
    }

    #[test]
    fn duplicate_email_and_username_conflict() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("dup@test.com", "user1", "hash").unwrap();

        let err = db.create_user("dup@test.com", "user2", "hash").unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref m) if m.contains("Email")));

        let err = db.create_user("other@test.com", "user1", "hash").unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref m) if m.contains("Username")));
    }

    #[test]
    fn missing_user_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(db.get_user(Uuid::new_v4()), Err(StoreError::NotFound)));
    }

    #[test]
    fn blank_email_rejected() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.create_user("  ", "user", "hash"),
            Err(StoreError::InvalidArgument(_))
        ));
    }
}
