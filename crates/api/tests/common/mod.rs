//! Shared test harness: router construction mirroring production, request
//! helpers, account fixtures, and an in-process stand-in for the remote
//! catalog.

// Each test binary compiles this module and uses its own subset.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use portal_api::auth::jwt::JwtConfig;
use portal_api::config::ServerConfig;
use portal_api::middleware::track::RequestGauge;
use portal_api::router::build_app_router;
use portal_api::state::AppState;
use portal_catalog::{CatalogService, RemoteCatalog, RetryPolicy};

/// A port that refuses connections immediately. Tests that never reach
/// the remote leg use it so an accidental call fails fast instead of
/// hanging on a real network.
pub const UNROUTABLE_CATALOG: &str = "http://127.0.0.1:9";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        catalog_base_url: UNROUTABLE_CATALOG.to_string(),
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            token_expiry_days: 30,
        },
    }
}

/// Build the full application router against an unroutable remote
/// catalog. Fine for everything that stays local.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_catalog(pool, UNROUTABLE_CATALOG)
}

/// Build the full application router with the remote catalog rooted at
/// `catalog_base_url` (usually a [`MockCatalog`]).
///
/// This goes through [`build_app_router`] so integration tests exercise
/// the same middleware stack (CORS, request ID, timeout, tracing, panic
/// recovery, request gauge) that production uses. Retries are disabled;
/// [`build_test_app_with_retries`] opts back in with zero backoff.
pub fn build_test_app_with_catalog(pool: PgPool, catalog_base_url: &str) -> Router {
    build_app(pool, catalog_base_url, RetryPolicy::none())
}

pub fn build_test_app_with_retries(
    pool: PgPool,
    catalog_base_url: &str,
    max_retries: u32,
) -> Router {
    let retry = RetryPolicy {
        max_retries,
        base_delay: Duration::ZERO,
    };
    build_app(pool, catalog_base_url, retry)
}

fn build_app(pool: PgPool, catalog_base_url: &str, retry: RetryPolicy) -> Router {
    let mut config = test_config();
    config.catalog_base_url = catalog_base_url.to_string();

    let remote = RemoteCatalog::new(config.catalog_base_url.clone()).with_retry_policy(retry);
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        catalog: Arc::new(CatalogService::new(remote)),
        request_gauge: RequestGauge::new(),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

/// POST without a body (the favorites add route takes everything from
/// the path).
pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Account fixtures
// ---------------------------------------------------------------------------

pub struct RegisteredUser {
    pub token: String,
    pub user_id: i64,
    /// Id of the default profile created at registration.
    pub profile_id: i64,
}

/// Register an account through the API and return its token and ids.
pub async fn register_user(pool: &PgPool, name: &str, email: &str) -> RegisteredUser {
    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({
            "name": name,
            "email": email,
            "password": "secret1",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    RegisteredUser {
        token: json["token"].as_str().unwrap().to_string(),
        user_id: json["user"]["id"].as_i64().unwrap(),
        profile_id: json["profiles"][0]["id"].as_i64().unwrap(),
    }
}

/// Create an extra profile, returning its id.
pub async fn create_profile(pool: &PgPool, token: &str, name: &str, kind: &str) -> i64 {
    let app = build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/profiles",
        token,
        serde_json::json!({ "name": name, "type": kind }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Create a custom character, returning its reference string (e.g. "3").
pub async fn create_character(
    pool: &PgPool,
    token: &str,
    name: &str,
    age_restriction: &str,
) -> String {
    let app = build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/characters",
        token,
        serde_json::json!({
            "name": name,
            "species": "Human",
            "age_restriction": age_restriction,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

/// Promote a user to the admin role directly in the database.
pub async fn make_admin(pool: &PgPool, user_id: i64) {
    sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
}

/// Deactivate an account directly in the database.
pub async fn deactivate_user(pool: &PgPool, user_id: i64) {
    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Mock remote catalog
// ---------------------------------------------------------------------------

/// Canned remote catalog served from an ephemeral local port.
///
/// Mirrors the upstream wire shapes: `GET /?name=...&page=...` answers a
/// search page with records 1 and 5 (5 lands in the adult-tagged id
/// slice), and `GET /{ids}` answers a single object for one id or an
/// array for several, 404ing ids beyond the catalog range. Requests are
/// counted so tests can assert cache hits and retry behaviour.
pub struct MockCatalog {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl MockCatalog {
    pub async fn spawn() -> Self {
        Self::spawn_failing(0).await
    }

    /// Serve `failures` 500 responses before answering normally.
    pub async fn spawn_failing(failures: usize) -> Self {
        let mock_state = MockState {
            hits: Arc::new(AtomicUsize::new(0)),
            failures_remaining: Arc::new(AtomicUsize::new(failures)),
        };
        let hits = Arc::clone(&mock_state.hits);

        let app = Router::new()
            .route("/", axum::routing::get(mock_search))
            .route("/{ids}", axum::routing::get(mock_by_ids))
            .with_state(mock_state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            hits,
        }
    }

    /// Requests the mock has answered, including failure responses.
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct MockState {
    hits: Arc<AtomicUsize>,
    failures_remaining: Arc<AtomicUsize>,
}

impl MockState {
    /// Consume one scripted failure, if any remain.
    fn take_failure(&self) -> bool {
        self.failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

/// A record shaped like the real catalog's, fields the adapter ignores
/// included.
pub fn mock_character(id: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": format!("Remote Character {id}"),
        "status": "Alive",
        "species": "Human",
        "type": "",
        "gender": "Male",
        "origin": { "name": "Earth (C-137)", "url": "" },
        "location": { "name": "Citadel of Ricks", "url": "" },
        "image": format!("https://example.com/avatar/{id}.jpeg"),
        "episode": [],
        "url": format!("https://example.com/character/{id}"),
        "created": "2017-11-04T18:48:46.250Z"
    })
}

async fn mock_search(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if state.take_failure() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "scripted failure").into_response();
    }

    let name = params.get("name").cloned().unwrap_or_default();
    if name.contains("nomatch") {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "There is nothing here" })),
        )
            .into_response();
    }

    Json(serde_json::json!({
        "info": { "count": 2, "pages": 1, "next": null, "prev": null },
        "results": [mock_character(1), mock_character(5)]
    }))
    .into_response()
}

async fn mock_by_ids(State(state): State<MockState>, Path(ids): Path<String>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if state.take_failure() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "scripted failure").into_response();
    }

    let ids: Vec<i64> = ids.split(',').filter_map(|part| part.parse().ok()).collect();
    if ids.is_empty() || ids.iter().any(|id| *id > 826) {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "Character not found" })),
        )
            .into_response();
    }

    match ids.as_slice() {
        [id] => Json(mock_character(*id)).into_response(),
        many => Json(serde_json::Value::Array(
            many.iter().map(|id| mock_character(*id)).collect(),
        ))
        .into_response(),
    }
}
