//! Public board routes. No account needed: anonymous visitors are tracked by
//! a long-lived `voter_id` cookie, logged-in users vote as themselves.

use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use feedbackcue_shared::constants::VOTER_COOKIE;
use feedbackcue_shared::{validate, FeedbackCategory, VoteOutcome};
use feedbackcue_store::{Board, Database, FeedbackItem, NewFeedback, User};

use super::boards::FeedbackQuery;
use super::AppState;
use crate::auth::optional_user;
use crate::cookies;
use crate::config::ServerConfig;
use crate::error::ServerError;

#[derive(Serialize)]
pub struct BoardView {
    board: Board,
    items: Vec<FeedbackItem>,
    voted_item_ids: HashSet<Uuid>,
}

#[derive(Deserialize)]
pub struct SubmitRequest {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    author_name: Option<String>,
    #[serde(default)]
    author_email: Option<String>,
}

#[derive(Default, Deserialize)]
pub struct VoteRequest {
    #[serde(default)]
    voter_email: Option<String>,
}

#[derive(Serialize)]
pub struct VoteResponse {
    outcome: VoteOutcome,
    voted: bool,
    vote_count: i64,
}

/// Who is voting: the logged-in user, else the voter cookie. A fresh cookie
/// is minted and added to the returned jar when the visitor has neither.
fn resolve_voter(jar: CookieJar, user: Option<&User>, config: &ServerConfig) -> (CookieJar, String) {
    if let Some(user) = user {
        return (jar, user.id.to_string());
    }
    if let Some(existing) = cookies::value(&jar, VOTER_COOKIE) {
        return (jar, existing);
    }

    let voter_id = Uuid::new_v4().to_string();
    debug!(voter_id = %voter_id, "issued voter cookie");
    let jar = jar.add(cookies::build(
        VOTER_COOKIE,
        voter_id.clone(),
        config.voter_cookie_max_age(),
        config.secure_cookies,
    ));
    (jar, voter_id)
}

fn board_by_slug(db: &Database, slug: &str) -> Result<Board, ServerError> {
    db.get_board_by_slug(slug)
        .map_err(|e| ServerError::from_store(e, "Board"))
}

pub async fn view(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Path(slug): Path<String>,
    Query(query): Query<FeedbackQuery>,
) -> Result<(CookieJar, Json<BoardView>), ServerError> {
    let filter = query.filter()?;

    let db = state.db.lock().await;
    let board = board_by_slug(&db, &slug)?;
    let user = optional_user(&headers, &db)?;

    let (jar, voter_id) = resolve_voter(jar, user.as_ref(), &state.config);

    let items = db.list_items(board.id, &filter)?;
    let voted_item_ids = db.voted_item_ids(board.id, &voter_id)?;

    Ok((
        jar,
        Json(BoardView {
            board,
            items,
            voted_item_ids,
        }),
    ))
}

pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<FeedbackItem>), ServerError> {
    let category: FeedbackCategory = match req.category.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() => c.parse()?,
        _ => Default::default(),
    };

    let db = state.db.lock().await;
    let board = board_by_slug(&db, &slug)?;
    let user = optional_user(&headers, &db)?;

    // Logged-in authors are credited unless they typed something else.
    let new = NewFeedback {
        title: req.title,
        description: req.description,
        category,
        author_email: req
            .author_email
            .or_else(|| user.as_ref().map(|u| u.email.clone())),
        author_name: req
            .author_name
            .or_else(|| user.as_ref().map(|u| u.username.clone())),
    };

    let item = db
        .create_feedback(board.id, &new)
        .map_err(|e| ServerError::from_store(e, "Board"))?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn vote(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Path((slug, item_id)): Path<(String, Uuid)>,
    body: Option<Json<VoteRequest>>,
) -> Result<(CookieJar, Json<VoteResponse>), ServerError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let mut db = state.db.lock().await;
    let board = board_by_slug(&db, &slug)?;
    db.get_board_feedback(board.id, item_id)
        .map_err(|e| ServerError::from_store(e, "Feedback item"))?;

    let user = optional_user(&headers, &db)?;
    let (jar, voter_id) = resolve_voter(jar, user.as_ref(), &state.config);
    let voter_email = validate::optional_text(req.voter_email.as_deref())
        .or_else(|| user.as_ref().map(|u| u.email.clone()));

    let outcome = db
        .toggle_vote(item_id, &voter_id, voter_email.as_deref())
        .map_err(|e| ServerError::from_store(e, "Feedback item"))?;
    let item = db.get_feedback(item_id)?;

    Ok((
        jar,
        Json(VoteResponse {
            outcome,
            voted: outcome.is_added(),
            vote_count: item.vote_count,
        }),
    ))
}
