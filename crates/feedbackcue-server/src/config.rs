//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development. The value is built once in `main`
//! and handed to whatever needs it.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;

use feedbackcue_shared::constants::{APP_NAME, DEFAULT_HTTP_PORT};

/// Longest accepted session lifetime (one year).
const MAX_SESSION_TTL_MINUTES: i64 = 365 * 24 * 60;

/// Browsers cap cookie lifetimes at 400 days.
const MAX_VOTER_COOKIE_DAYS: i64 = 400;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8000`
    pub http_addr: SocketAddr,

    /// SQLite database file.
    /// Env: `DATABASE_PATH`
    /// Default: unset, meaning the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Name reported by `/health`.
    /// Env: `APP_NAME`
    /// Default: `"FeedbackCue"`
    pub app_name: String,

    /// Deployment environment label (`development`, `production`, ...).
    /// Env: `ENVIRONMENT`
    /// Default: `development`
    pub environment: String,

    /// Lifetime of a login session in minutes.
    /// Env: `SESSION_TTL_MINUTES`
    /// Default: `1440` (24 hours). Values above one year are rejected.
    pub session_ttl_minutes: i64,

    /// Lifetime of the anonymous voter cookie in days.
    /// Env: `VOTER_COOKIE_MAX_AGE_DAYS`
    /// Default: `365`. Values above 400 are rejected.
    pub voter_cookie_max_age_days: i64,

    /// Add the `Secure` attribute to cookies (HTTPS deployments).
    /// Env: `SECURE_COOKIES` (true/false)
    /// Default: `false`
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            database_path: None,
            app_name: APP_NAME.to_string(),
            environment: "development".to_string(),
            session_ttl_minutes: 24 * 60,
            voter_cookie_max_age_days: 365,
            secure_cookies: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = var("HTTP_ADDR") {
            match addr.parse::<SocketAddr>() {
                Ok(parsed) => config.http_addr = parsed,
                Err(_) => tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default"),
            }
        }

        if let Some(path) = var("DATABASE_PATH").filter(|p| !p.is_empty()) {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Some(name) = var("APP_NAME").filter(|n| !n.is_empty()) {
            config.app_name = name;
        }

        if let Some(env) = var("ENVIRONMENT").filter(|e| !e.is_empty()) {
            config.environment = env;
        }

        if let Some(val) = var("SESSION_TTL_MINUTES") {
            match val.parse::<i64>() {
                Ok(n) if (1..=MAX_SESSION_TTL_MINUTES).contains(&n) => {
                    config.session_ttl_minutes = n
                }
                _ => tracing::warn!(value = %val, "Invalid SESSION_TTL_MINUTES, using default"),
            }
        }

        if let Some(val) = var("VOTER_COOKIE_MAX_AGE_DAYS") {
            match val.parse::<i64>() {
                Ok(n) if (1..=MAX_VOTER_COOKIE_DAYS).contains(&n) => {
                    config.voter_cookie_max_age_days = n
                }
                _ => tracing::warn!(value = %val, "Invalid VOTER_COOKIE_MAX_AGE_DAYS, using default"),
            }
        }

        if let Some(val) = var("SECURE_COOKIES") {
            config.secure_cookies = val == "true" || val == "1";
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::minutes(self.session_ttl_minutes)
    }

    pub fn voter_cookie_max_age(&self) -> Duration {
        Duration::days(self.voter_cookie_max_age_days)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
