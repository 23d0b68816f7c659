//! Password hashing, session tokens and request authentication.
//!
//! Passwords are stored as argon2 PHC strings. A session token is 32 random
//! bytes, hex-encoded and handed to the client; the database only keeps its
//! BLAKE3 hash. Requests authenticate with `Authorization: Bearer <token>`
//! or the `session` cookie.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;

use feedbackcue_shared::constants::SESSION_COOKIE;
use feedbackcue_store::{Database, User};

use crate::cookies;
use crate::error::ServerError;

pub fn hash_password(password: &str) -> Result<String, ServerError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServerError::Internal(format!("Password hashing failed: {e}")))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is malformed");
            false
        }
    }
}

/// Fresh random session token (64 hex chars).
pub fn new_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// The form in which a token is stored.
pub fn token_hash(token: &str) -> String {
    blake3::hash(token.as_bytes()).to_hex().to_string()
}

/// Session token presented by the request, bearer header first.
pub fn request_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    bearer.or_else(|| cookies::value(&CookieJar::from_headers(headers), SESSION_COOKIE))
}

/// The logged-in user, if the request carries a live session.
pub fn optional_user(headers: &HeaderMap, db: &Database) -> Result<Option<User>, ServerError> {
    let Some(token) = request_token(headers) else {
        return Ok(None);
    };
    Ok(db.get_session_user(&token_hash(&token), Utc::now())?)
}

/// The logged-in user, or `Unauthorized`.
pub fn require_user(headers: &HeaderMap, db: &Database) -> Result<User, ServerError> {
    optional_user(headers, db)?.ok_or(ServerError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use axum::http::header::COOKIE;
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("password123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("password123", &hash));
        assert!(!verify_password("password124", &hash));
        assert!(!verify_password("password123", "not-a-phc-string"));
    }

    #[test]
    fn tokens_are_unique_and_hashed() {
        let a = new_session_token();
        let b = new_session_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_ne!(token_hash(&a), a);
        assert_eq!(token_hash(&a), token_hash(&a));
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session=from-cookie"));
        assert_eq!(request_token(&headers).as_deref(), Some("from-cookie"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(request_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn resolves_session_user() {
        let db = Database::open_in_memory().unwrap();
        let user = db.create_user("a@test.com", "a", "hash").unwrap();
        let token = new_session_token();
        db.create_session(&token_hash(&token), user.id, Utc::now() + chrono::Duration::hours(1))
            .unwrap();

        let mut headers = HeaderMap::new();
        assert!(matches!(require_user(&headers, &db), Err(ServerError::Unauthorized)));

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        assert_eq!(require_user(&headers, &db).unwrap().id, user.id);
    }
}
