//! # feedbackcue-server
//!
//! HTTP server for FeedbackCue.
//!
//! This binary provides:
//! - **Accounts** with argon2-hashed passwords and cookie or bearer sessions
//! - **Owner dashboard** API for creating and managing feedback boards
//! - **Public boards** addressed by slug, where anyone can post feedback and
//!   toggle one vote per item
//! - A background task that purges expired sessions

mod api;
mod auth;
mod config;
mod cookies;
mod error;

use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use feedbackcue_store::Database;

use crate::api::AppState;
use crate::config::ServerConfig;

/// How often expired sessions are swept from the database.
const SESSION_PURGE_INTERVAL_SECS: u64 = 600;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,feedbackcue_server=debug,feedbackcue_store=debug")
        }))
        .init();

    info!("Starting FeedbackCue server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Open the database (runs migrations)
    // -----------------------------------------------------------------------
    let db = match &config.database_path {
        Some(path) => Database::open_at(path)?,
        None => Database::new()?,
    };
    if let Some(path) = db.path() {
        info!(path = %path.display(), environment = %config.environment, "Database ready");
    }

    if !config.is_development() && !config.secure_cookies {
        tracing::warn!("SECURE_COOKIES is off outside development");
    }

    let http_addr = config.http_addr;
    let app_state = AppState::new(db, config);

    // -----------------------------------------------------------------------
    // 4. Spawn background tasks
    // -----------------------------------------------------------------------
    let db = app_state.db.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(SESSION_PURGE_INTERVAL_SECS));
        loop {
            interval.tick().await;
            match db.lock().await.purge_expired_sessions(Utc::now()) {
                Ok(0) => {}
                Ok(purged) => info!(purged, "Purged expired sessions"),
                Err(e) => tracing::warn!(error = %e, "Session purge failed"),
            }
        }
    });

    // -----------------------------------------------------------------------
    // 5. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
