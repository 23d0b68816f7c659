//! HTTP API.
//!
//! Three groups of routes share one [`AppState`]:
//! - `/api/auth/*` for accounts and sessions ([`auth`])
//! - `/api/boards/*` for the owner dashboard ([`boards`])
//! - `/api/b/:slug/*` for the public board, where anyone can post and vote
//!   ([`public`])

mod auth;
mod boards;
mod public;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::Method,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use feedbackcue_store::Database;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/boards", get(boards::list).post(boards::create))
        .route(
            "/api/boards/:board_id",
            get(boards::show).patch(boards::update).delete(boards::remove),
        )
        .route("/api/boards/:board_id/feedback", get(boards::feedback))
        .route(
            "/api/boards/:board_id/feedback/:item_id/status",
            post(boards::set_status),
        )
        .route(
            "/api/boards/:board_id/feedback/:item_id/votes",
            get(boards::votes),
        )
        .route("/api/b/:slug", get(public::view))
        .route("/api/b/:slug/feedback", post(public::submit))
        .route("/api/b/:slug/vote/:item_id", post(public::vote))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    app: String,
    version: &'static str,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        app: state.config.app_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(%addr, "HTTP API server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
