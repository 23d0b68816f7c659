//! Owner dashboard. Every handler here requires a session, and boards that
//! belong to someone else are reported as missing.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use feedbackcue_shared::FeedbackStatus;
use feedbackcue_store::{
    Board, BoardStats, BoardUpdate, Database, FeedbackFilter, FeedbackItem, NewBoard, User, Vote,
};

use super::AppState;
use crate::auth::require_user;
use crate::error::ServerError;

#[derive(Serialize)]
pub struct BoardSummary {
    board: Board,
    stats: BoardStats,
}

#[derive(Deserialize)]
pub struct FeedbackQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

impl FeedbackQuery {
    pub fn filter(&self) -> Result<FeedbackFilter, ServerError> {
        Ok(FeedbackFilter::parse(
            self.status.as_deref(),
            self.category.as_deref(),
            self.sort.as_deref(),
        )?)
    }
}

#[derive(Deserialize)]
pub struct StatusRequest {
    status: String,
}

fn owned_board(db: &Database, board_id: Uuid, user: &User) -> Result<Board, ServerError> {
    db.get_owned_board(board_id, user.id)
        .map_err(|e| ServerError::from_store(e, "Board"))
}

fn summary(db: &Database, board: Board) -> Result<BoardSummary, ServerError> {
    let stats = db.board_stats(board.id)?;
    Ok(BoardSummary { board, stats })
}

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<BoardSummary>>, ServerError> {
    let db = state.db.lock().await;
    let user = require_user(&headers, &db)?;

    let boards = db
        .list_boards_for_owner(user.id)?
        .into_iter()
        .map(|board| summary(&db, board))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(boards))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<NewBoard>,
) -> Result<(StatusCode, Json<Board>), ServerError> {
    let mut db = state.db.lock().await;
    let user = require_user(&headers, &db)?;

    let board = db.create_board(user.id, &req)?;
    Ok((StatusCode::CREATED, Json(board)))
}

pub async fn show(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(board_id): Path<Uuid>,
) -> Result<Json<BoardSummary>, ServerError> {
    let db = state.db.lock().await;
    let user = require_user(&headers, &db)?;

    let board = owned_board(&db, board_id, &user)?;
    Ok(Json(summary(&db, board)?))
}

pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(board_id): Path<Uuid>,
    Json(req): Json<BoardUpdate>,
) -> Result<Json<Board>, ServerError> {
    let mut db = state.db.lock().await;
    let user = require_user(&headers, &db)?;

    owned_board(&db, board_id, &user)?;
    let board = db
        .update_board(board_id, &req)
        .map_err(|e| ServerError::from_store(e, "Board"))?;
    Ok(Json(board))
}

pub async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(board_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let db = state.db.lock().await;
    let user = require_user(&headers, &db)?;

    owned_board(&db, board_id, &user)?;
    db.delete_board(board_id)?;
    info!(board_id = %board_id, user_id = %user.id, "board deleted via API");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(board_id): Path<Uuid>,
    Query(query): Query<FeedbackQuery>,
) -> Result<Json<Vec<FeedbackItem>>, ServerError> {
    let filter = query.filter()?;

    let db = state.db.lock().await;
    let user = require_user(&headers, &db)?;

    let board = owned_board(&db, board_id, &user)?;
    Ok(Json(db.list_items(board.id, &filter)?))
}

pub async fn set_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((board_id, item_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<FeedbackItem>, ServerError> {
    let status: FeedbackStatus = req.status.trim().parse()?;

    let db = state.db.lock().await;
    let user = require_user(&headers, &db)?;

    let board = owned_board(&db, board_id, &user)?;
    db.get_board_feedback(board.id, item_id)
        .map_err(|e| ServerError::from_store(e, "Feedback item"))?;

    Ok(Json(db.update_feedback_status(item_id, status)?))
}

/// Who voted on an item, oldest first.
pub async fn votes(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((board_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<Vote>>, ServerError> {
    let db = state.db.lock().await;
    let user = require_user(&headers, &db)?;

    let board = owned_board(&db, board_id, &user)?;
    db.get_board_feedback(board.id, item_id)
        .map_err(|e| ServerError::from_store(e, "Feedback item"))?;

    Ok(Json(db.list_votes(item_id)?))
}
