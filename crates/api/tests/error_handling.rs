//! Tests for the error-to-HTTP mapping.
//!
//! These exercise [`AppError`]'s `IntoResponse` impl directly, without a
//! database or router, so every variant's status code and JSON body is
//! pinned down in one place.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;

use portal_api::error::AppError;
use portal_catalog::remote::RemoteError;
use portal_catalog::service::CatalogError;
use portal_core::error::CoreError;

async fn error_to_response(error: AppError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Core error variants
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_not_found_maps_to_404() {
    let error = AppError::Core(CoreError::NotFound {
        entity: "Character",
        id: "api-7".to_string(),
    });
    let (status, json) = error_to_response(error).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Character with id api-7 not found");
}

#[tokio::test]
async fn test_validation_maps_to_400() {
    let error = AppError::Core(CoreError::Validation("Name is required".to_string()));
    let (status, json) = error_to_response(error).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Name is required");
}

#[tokio::test]
async fn test_conflict_maps_to_409() {
    let error = AppError::Core(CoreError::Conflict(
        "Email is already registered".to_string(),
    ));
    let (status, json) = error_to_response(error).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn test_unauthorized_maps_to_401() {
    let error = AppError::Core(CoreError::Unauthorized(
        "Invalid or expired token".to_string(),
    ));
    let (status, json) = error_to_response(error).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_forbidden_maps_to_403() {
    let error = AppError::Core(CoreError::Forbidden(
        "Profile does not belong to the authenticated user".to_string(),
    ));
    let (status, json) = error_to_response(error).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_core_internal_is_sanitized() {
    let error = AppError::Core(CoreError::Internal(
        "connection pool exhausted at worker 3".to_string(),
    ));
    let (status, json) = error_to_response(error).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    // Internals never leak into the body.
    assert_eq!(json["error"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// API-level variants
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_bad_request_keeps_its_message() {
    let error = AppError::BadRequest("A user can have at most 5 profiles".to_string());
    let (status, json) = error_to_response(error).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "A user can have at most 5 profiles");
}

#[tokio::test]
async fn test_internal_error_is_sanitized() {
    let error = AppError::InternalError("password hashing failed".to_string());
    let (status, json) = error_to_response(error).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Upstream and database failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_remote_catalog_failure_maps_to_502() {
    let error = AppError::Catalog(CatalogError::Remote(RemoteError::Status {
        status: 503,
        body: "upstream maintenance".to_string(),
    }));
    let (status, json) = error_to_response(error).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    // The upstream body stays out of ours.
    assert_eq!(json["error"], "Remote catalog is unavailable");
}

#[tokio::test]
async fn test_row_not_found_maps_to_404() {
    let error = AppError::Database(sqlx::Error::RowNotFound);
    let (status, json) = error_to_response(error).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Record not found");
}

#[tokio::test]
async fn test_catalog_core_errors_classify_like_core_errors() {
    let error = AppError::Catalog(CatalogError::Core(CoreError::Forbidden(
        "Character not available on a child profile".to_string(),
    )));
    let (status, json) = error_to_response(error).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}
