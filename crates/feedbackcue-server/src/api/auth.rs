use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use feedbackcue_shared::constants::SESSION_COOKIE;
use feedbackcue_shared::validate;
use feedbackcue_store::User;

use super::AppState;
use crate::auth::{self as session, hash_password, verify_password};
use crate::cookies;
use crate::error::ServerError;

#[derive(Deserialize)]
pub struct RegisterRequest {
    email: String,
    username: String,
    password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    user: User,
    token: String,
}

/// Open a session for `user` and add the cookie that carries it.
async fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: User,
) -> Result<(CookieJar, Json<SessionResponse>), ServerError> {
    let token = session::new_session_token();
    let expires_at = Utc::now() + state.config.session_ttl();

    state
        .db
        .lock()
        .await
        .create_session(&session::token_hash(&token), user.id, expires_at)?;

    let jar = jar.add(cookies::build(
        SESSION_COOKIE,
        token.clone(),
        state.config.session_ttl(),
        state.config.secure_cookies,
    ));

    Ok((jar, Json(SessionResponse { user, token })))
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>), ServerError> {
    if !req.email.contains('@') {
        return Err(ServerError::BadRequest("email address is malformed".into()));
    }
    validate::password(&req.password)?;
    let password_hash = hash_password(&req.password)?;

    let user = state
        .db
        .lock()
        .await
        .create_user(req.email.trim(), req.username.trim(), &password_hash)?;

    let (jar, body) = start_session(&state, jar, user).await?;
    Ok((StatusCode::CREATED, jar, body))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), ServerError> {
    let user = state.db.lock().await.get_user_by_email(req.email.trim())?;

    let Some(user) = user.filter(|u| verify_password(&req.password, &u.password_hash)) else {
        debug!(email = %req.email, "login rejected");
        return Err(ServerError::InvalidCredentials);
    };

    info!(user_id = %user.id, "user logged in");
    start_session(&state, jar, user).await
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), ServerError> {
    if let Some(token) = session::request_token(&headers) {
        let removed = state
            .db
            .lock()
            .await
            .delete_session(&session::token_hash(&token))?;
        debug!(removed, "logout");
    }

    Ok((StatusCode::NO_CONTENT, jar.add(cookies::removal(SESSION_COOKIE))))
}

pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<User>, ServerError> {
    let db = state.db.lock().await;
    Ok(Json(session::require_user(&headers, &db)?))
}
