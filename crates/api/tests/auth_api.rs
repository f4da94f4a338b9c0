//! HTTP-level integration tests for registration, login and account
//! self-service.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json, put_json_auth};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_creates_account_with_default_profile(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({
            "name": "Ana",
            "email": "ana@example.com",
            "password": "secret1",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;

    assert_eq!(json["user"]["name"], "Ana");
    assert_eq!(json["user"]["email"], "ana@example.com");
    assert_eq!(json["user"]["role"], "user");
    assert!(json["user"]["password_hash"].is_null());
    assert!(!json["token"].as_str().unwrap().is_empty());

    // One adult profile, named after the account.
    let profiles = json["profiles"].as_array().unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0]["name"], "Ana's Profile");
    assert_eq!(profiles[0]["type"], "adult");
    assert_eq!(profiles[0]["age"], 18);
    assert_eq!(profiles[0]["favorites"], serde_json::json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_duplicate_email_returns_409(pool: PgPool) {
    common::register_user(&pool, "Ana", "ana@example.com").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({
            "name": "Impostor",
            "email": "ana@example.com",
            "password": "secret1",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_rejects_short_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({
            "name": "Ana",
            "email": "ana@example.com",
            "password": "12345",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_rejects_blank_name_and_bad_email(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({ "name": "   ", "email": "ana@example.com", "password": "secret1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/register",
        serde_json::json!({ "name": "Ana", "email": "not-an-email", "password": "secret1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_returns_token_and_profiles(pool: PgPool) {
    let user = common::register_user(&pool, "Ana", "ana@example.com").await;
    common::create_profile(&pool, &user.token, "Kids", "child").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": "ana@example.com", "password": "secret1" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(!json["token"].as_str().unwrap().is_empty());
    assert_eq!(json["user"]["email"], "ana@example.com");
    assert_eq!(json["profiles"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_failure_is_indistinguishable(pool: PgPool) {
    common::register_user(&pool, "Ana", "ana@example.com").await;

    // Wrong password.
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": "ana@example.com", "password": "wrong-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = body_json(response).await;

    // Unknown email.
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": "nobody@example.com", "password": "secret1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let unknown_email = body_json(response).await;

    // Same body either way, so responses don't leak which emails exist.
    assert_eq!(wrong_password, unknown_email);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_email_is_case_insensitive(pool: PgPool) {
    common::register_user(&pool, "Ana", "ana@example.com").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": "ANA@Example.COM", "password": "secret1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Account self-view / self-update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_me_requires_valid_token(pool: PgPool) {
    let user = common::register_user(&pool, "Ana", "ana@example.com").await;

    let app = common::build_test_app(pool.clone());
    let response = common::get(app, "/api/v1/auth/profile").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/auth/profile", "garbage-token").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/profile", &user.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["email"], "ana@example.com");
    assert_eq!(json["profiles"].as_array().unwrap().len(), 1);
    assert!(json["token"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deactivated_account_is_rejected(pool: PgPool) {
    let user = common::register_user(&pool, "Ana", "ana@example.com").await;
    common::deactivate_user(&pool, user.user_id).await;

    // The still-unexpired token no longer authenticates.
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/profile", &user.token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_account_changes_email_and_reissues_token(pool: PgPool) {
    let user = common::register_user(&pool, "Ana", "ana@example.com").await;

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        "/api/v1/auth/profile",
        &user.token,
        serde_json::json!({ "email": "ana.new@example.com" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["email"], "ana.new@example.com");
    assert_eq!(json["user"]["name"], "Ana");
    assert!(!json["token"].as_str().unwrap().is_empty());

    // The new email logs in.
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": "ana.new@example.com", "password": "secret1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_account_password_change_applies(pool: PgPool) {
    let user = common::register_user(&pool, "Ana", "ana@example.com").await;

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        "/api/v1/auth/profile",
        &user.token,
        serde_json::json!({ "password": "brand-new-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": "ana@example.com", "password": "secret1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": "ana@example.com", "password": "brand-new-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_account_rejects_taken_email(pool: PgPool) {
    common::register_user(&pool, "Ana", "ana@example.com").await;
    let other = common::register_user(&pool, "Ben", "ben@example.com").await;

    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        "/api/v1/auth/profile",
        &other.token,
        serde_json::json!({ "email": "ana@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
