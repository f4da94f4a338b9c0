//! API-level error type and its HTTP mapping.
//!
//! Every handler returns [`AppResult`]; the [`IntoResponse`] impl is the
//! single place where errors become status codes and JSON bodies, so no
//! handler builds an error response by hand.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use portal_catalog::service::CatalogError;
use portal_core::error::CoreError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Database(error) => classify_sqlx_error(error),
            AppError::Catalog(catalog) => match catalog {
                CatalogError::Core(core) => classify_core_error(core),
                CatalogError::Db(error) => classify_sqlx_error(error),
                CatalogError::Remote(error) => {
                    tracing::error!("Remote catalog failure: {error}");
                    (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_ERROR",
                        "Remote catalog is unavailable".to_string(),
                    )
                }
            },
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", message.clone())
            }
            AppError::InternalError(message) => {
                tracing::error!("Internal error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

fn classify_core_error(error: &CoreError) -> (StatusCode, &'static str, String) {
    match error {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(message) => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            message.clone(),
        ),
        CoreError::Conflict(message) => (StatusCode::CONFLICT, "CONFLICT", message.clone()),
        CoreError::Unauthorized(message) => {
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message.clone())
        }
        CoreError::Forbidden(message) => (StatusCode::FORBIDDEN, "FORBIDDEN", message.clone()),
        CoreError::Internal(message) => {
            tracing::error!("Internal error: {message}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// Map database failures, keeping driver details out of response bodies.
///
/// Unique-constraint violations surface as 409s when the constraint
/// follows the `uq_` naming convention; everything else is a sanitized
/// 500.
fn classify_sqlx_error(error: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match error {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Record not found".to_string(),
        ),
        sqlx::Error::Database(db_error) => {
            if db_error.code().as_deref() == Some("23505") {
                let constraint = db_error.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!("Database error: {db_error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!("Database error: {other}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
