use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use feedbackcue_store::Database;

use super::{build_router, AppState};
use crate::config::ServerConfig;

fn app() -> Router {
    let db = Database::open_in_memory().unwrap();
    build_router(AppState::new(db, ServerConfig::default()))
}

struct Reply {
    status: StatusCode,
    set_cookie: Vec<String>,
    body: Value,
}

impl Reply {
    /// The `name=value` pair of a cookie set by this response.
    fn cookie(&self, name: &str) -> Option<String> {
        self.set_cookie
            .iter()
            .filter_map(|c| c.split(';').next())
            .find(|pair| pair.starts_with(&format!("{name}=")))
            .map(str::to_string)
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> Reply {
    let mut req = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
        req = req.header(*k, *v);
    }
    let req = match body {
        Some(json) => req
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let set_cookie = res
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    Reply { status, set_cookie, body }
}

async fn register(app: &Router, name: &str) -> String {
    let reply = send(
        app,
        "POST",
        "/api/auth/register",
        Some(json!({
            "email": format!("{name}@test.com"),
            "username": name,
            "password": "password123",
        })),
        &[],
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    format!("Bearer {}", reply.body["token"].as_str().unwrap())
}

async fn create_board(app: &Router, auth: &str, name: &str) -> Value {
    let reply = send(
        app,
        "POST",
        "/api/boards",
        Some(json!({ "name": name })),
        &[("authorization", auth)],
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    reply.body
}

async fn submit(app: &Router, slug: &str, title: &str, category: &str) -> Value {
    let reply = send(
        app,
        "POST",
        &format!("/api/b/{slug}/feedback"),
        Some(json!({ "title": title, "category": category })),
        &[],
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    reply.body
}

#[tokio::test]
async fn health_reports_app_name() {
    let reply = send(&app(), "GET", "/health", None, &[]).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], "ok");
    assert_eq!(reply.body["app"], "FeedbackCue");
}

#[tokio::test]
async fn register_login_logout() {
    let app = app();

    let reply = send(
        &app,
        "POST",
        "/api/auth/register",
        Some(json!({ "email": "a@test.com", "username": "alice", "password": "password123" })),
        &[],
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["user"]["username"], "alice");
    assert!(reply.body["user"].get("password_hash").is_none());
    let cookie = reply.cookie("session").unwrap();

    // The session cookie alone authenticates.
    let me = send(&app, "GET", "/api/auth/me", None, &[(COOKIE.as_str(), cookie.as_str())]).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], "a@test.com");

    let dup = send(
        &app,
        "POST",
        "/api/auth/register",
        Some(json!({ "email": "a@test.com", "username": "other", "password": "password123" })),
        &[],
    )
    .await;
    assert_eq!(dup.status, StatusCode::CONFLICT);
    assert_eq!(dup.body["error"], "Email already registered");

    let bad = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "a@test.com", "password": "wrong-password" })),
        &[],
    )
    .await;
    assert_eq!(bad.status, StatusCode::UNAUTHORIZED);

    let ok = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "a@test.com", "password": "password123" })),
        &[],
    )
    .await;
    assert_eq!(ok.status, StatusCode::OK);
    let bearer = format!("Bearer {}", ok.body["token"].as_str().unwrap());

    let out = send(&app, "POST", "/api/auth/logout", None, &[(AUTHORIZATION.as_str(), bearer.as_str())]).await;
    assert_eq!(out.status, StatusCode::NO_CONTENT);
    assert_eq!(out.cookie("session").as_deref(), Some("session="));

    let me = send(&app, "GET", "/api/auth/me", None, &[(AUTHORIZATION.as_str(), bearer.as_str())]).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn short_password_is_rejected() {
    let reply = send(
        &app(),
        "POST",
        "/api/auth/register",
        Some(json!({ "email": "a@test.com", "username": "alice", "password": "short" })),
        &[],
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn boards_require_auth_and_ownership() {
    let app = app();
    let anon = send(&app, "GET", "/api/boards", None, &[]).await;
    assert_eq!(anon.status, StatusCode::UNAUTHORIZED);

    let owner = register(&app, "owner").await;
    let other = register(&app, "other").await;

    let first = create_board(&app, &owner, "Same Name").await;
    let second = create_board(&app, &owner, "Same Name").await;
    let third = create_board(&app, &other, "Same Name").await;
    assert_eq!(first["slug"], "same-name");
    assert_eq!(second["slug"], "same-name-1");
    assert_eq!(third["slug"], "same-name-2");

    let list = send(&app, "GET", "/api/boards", None, &[("authorization", owner.as_str())]).await;
    let boards = list.body.as_array().unwrap();
    assert_eq!(boards.len(), 2);
    assert_eq!(boards[0]["board"]["id"], second["id"]);
    assert_eq!(boards[0]["stats"]["item_count"], 0);

    let uri = format!("/api/boards/{}", first["id"].as_str().unwrap());
    let foreign = send(&app, "GET", &uri, None, &[("authorization", other.as_str())]).await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);
    assert_eq!(foreign.body["error"], "Board not found");
}

#[tokio::test]
async fn update_and_delete_board() {
    let app = app();
    let owner = register(&app, "owner").await;
    let board = create_board(&app, &owner, "Roadmap").await;
    let uri = format!("/api/boards/{}", board["id"].as_str().unwrap());

    let patched = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "slug": "Public Roadmap", "accent_color": "#112233" })),
        &[("authorization", owner.as_str())],
    )
    .await;
    assert_eq!(patched.status, StatusCode::OK);
    assert_eq!(patched.body["slug"], "public-roadmap");
    assert_eq!(patched.body["accent_color"], "#112233");

    let bad_color = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "accent_color": "blue" })),
        &[("authorization", owner.as_str())],
    )
    .await;
    assert_eq!(bad_color.status, StatusCode::UNPROCESSABLE_ENTITY);

    let deleted = send(&app, "DELETE", &uri, None, &[("authorization", owner.as_str())]).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = send(&app, "GET", "/api/b/public-roadmap", None, &[]).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn anonymous_votes_toggle_per_cookie() {
    let app = app();
    let owner = register(&app, "owner").await;
    create_board(&app, &owner, "Ideas").await;
    let item = submit(&app, "ideas", "Dark mode", "feature").await;
    assert_eq!(item["author_name"], "Anonymous");
    let vote_uri = format!("/api/b/ideas/vote/{}", item["id"].as_str().unwrap());

    // First vote without a cookie mints one.
    let a1 = send(&app, "POST", &vote_uri, None, &[]).await;
    assert_eq!(a1.status, StatusCode::OK);
    assert_eq!(a1.body["outcome"], "added");
    assert_eq!(a1.body["vote_count"], 1);
    let voter_a = a1.cookie("voter_id").unwrap();

    let b1 = send(&app, "POST", &vote_uri, None, &[("cookie", "voter_id=voter-b")]).await;
    assert_eq!(b1.body["vote_count"], 2);
    assert!(b1.cookie("voter_id").is_none());

    let a2 = send(&app, "POST", &vote_uri, None, &[("cookie", voter_a.as_str())]).await;
    assert_eq!(a2.body["outcome"], "removed");
    assert_eq!(a2.body["voted"], false);
    assert_eq!(a2.body["vote_count"], 1);

    let view = send(&app, "GET", "/api/b/ideas", None, &[("cookie", "voter_id=voter-b")]).await;
    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.body["items"][0]["vote_count"], 1);
    assert_eq!(view.body["voted_item_ids"], json!([item["id"]]));
}

#[tokio::test]
async fn vote_on_item_from_another_board_is_not_found() {
    let app = app();
    let owner = register(&app, "owner").await;
    create_board(&app, &owner, "First").await;
    create_board(&app, &owner, "Second").await;
    let item = submit(&app, "first", "Export", "feature").await;

    let uri = format!("/api/b/second/vote/{}", item["id"].as_str().unwrap());
    let reply = send(&app, "POST", &uri, None, &[]).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["error"], "Feedback item not found");
}

#[tokio::test]
async fn logged_in_users_vote_as_themselves() {
    let app = app();
    let owner = register(&app, "owner").await;
    create_board(&app, &owner, "Ideas").await;
    let item = submit(&app, "ideas", "Dark mode", "feature").await;
    let vote_uri = format!("/api/b/ideas/vote/{}", item["id"].as_str().unwrap());

    // A different voter cookie does not matter once authenticated.
    let first = send(
        &app,
        "POST",
        &vote_uri,
        None,
        &[("authorization", owner.as_str()), ("cookie", "voter_id=one")],
    )
    .await;
    assert_eq!(first.body["outcome"], "added");
    assert!(first.cookie("voter_id").is_none());

    let second = send(
        &app,
        "POST",
        &vote_uri,
        None,
        &[("authorization", owner.as_str()), ("cookie", "voter_id=two")],
    )
    .await;
    assert_eq!(second.body["outcome"], "removed");
    assert_eq!(second.body["vote_count"], 0);
}

#[tokio::test]
async fn owner_filters_and_sets_status() {
    let app = app();
    let owner = register(&app, "owner").await;
    let board = create_board(&app, &owner, "Ideas").await;
    submit(&app, "ideas", "Crash on save", "bug").await;
    let feature = submit(&app, "ideas", "Dark mode", "feature").await;
    let board_uri = format!("/api/boards/{}", board["id"].as_str().unwrap());

    let bugs = send(
        &app,
        "GET",
        &format!("{board_uri}/feedback?category=bug&sort=newest"),
        None,
        &[("authorization", owner.as_str())],
    )
    .await;
    assert_eq!(bugs.status, StatusCode::OK);
    let items = bugs.body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Crash on save");

    let unknown = send(
        &app,
        "GET",
        &format!("{board_uri}/feedback?status=someday"),
        None,
        &[("authorization", owner.as_str())],
    )
    .await;
    assert_eq!(unknown.status, StatusCode::UNPROCESSABLE_ENTITY);

    let status_uri = format!("{board_uri}/feedback/{}/status", feature["id"].as_str().unwrap());
    let planned = send(
        &app,
        "POST",
        &status_uri,
        Some(json!({ "status": "planned" })),
        &[("authorization", owner.as_str())],
    )
    .await;
    assert_eq!(planned.status, StatusCode::OK);
    assert_eq!(planned.body["status"], "planned");

    let stats = send(&app, "GET", &board_uri, None, &[("authorization", owner.as_str())]).await;
    assert_eq!(stats.body["stats"]["item_count"], 2);
    assert_eq!(stats.body["stats"]["open_count"], 1);
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let app = app();
    let owner = register(&app, "owner").await;
    create_board(&app, &owner, "Ideas").await;

    let reply = send(
        &app,
        "POST",
        "/api/b/ideas/feedback",
        Some(json!({ "title": "   " })),
        &[],
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn malformed_email_is_a_bad_request() {
    let reply = send(
        &app(),
        "POST",
        "/api/auth/register",
        Some(json!({ "email": "alice", "username": "alice", "password": "password123" })),
        &[],
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn anonymous_voter_email_is_recorded() {
    let app = app();
    let owner = register(&app, "owner").await;
    let board = create_board(&app, &owner, "Ideas").await;
    let item = submit(&app, "ideas", "Dark mode", "feature").await;
    let item_id = item["id"].as_str().unwrap();

    let voted = send(
        &app,
        "POST",
        &format!("/api/b/ideas/vote/{item_id}"),
        Some(json!({ "voter_email": "  v@test.com " })),
        &[("cookie", "voter_id=anon")],
    )
    .await;
    assert_eq!(voted.status, StatusCode::OK);
    assert_eq!(voted.body["outcome"], "added");

    let votes_uri = format!(
        "/api/boards/{}/feedback/{item_id}/votes",
        board["id"].as_str().unwrap()
    );
    let votes = send(&app, "GET", &votes_uri, None, &[("authorization", owner.as_str())]).await;
    assert_eq!(votes.status, StatusCode::OK);
    let votes = votes.body.as_array().unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0]["voter_id"], "anon");
    assert_eq!(votes[0]["voter_email"], "v@test.com");

    // The vote list is for the board owner only.
    let other = register(&app, "other").await;
    let foreign = send(&app, "GET", &votes_uri, None, &[("authorization", other.as_str())]).await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);
}
