//! Bearer-token authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use portal_core::error::CoreError;
use portal_core::roles;
use portal_core::types::DbId;
use portal_db::models::user::User;
use portal_db::repositories::UserRepo;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The authenticated caller, freshly loaded from the database.
///
/// Extraction rejects with 401 when the `Authorization` header is
/// missing or malformed, the token fails validation, or the account has
/// been deactivated since the token was issued. Add this as a handler
/// parameter to make a route require authentication.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
}

impl CurrentUser {
    pub fn id(&self) -> DbId {
        self.user.id
    }

    pub fn is_admin(&self) -> bool {
        roles::is_admin(&self.user.role)
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".to_string(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".to_string(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired token".to_string(),
            ))
        })?;

        // Tokens outlive account changes; the database decides who the
        // caller is right now.
        let user = UserRepo::find_by_id(&state.pool, claims.sub)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Invalid or expired token".to_string(),
                ))
            })?;

        if !user.is_active {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Account is deactivated".to_string(),
            )));
        }

        Ok(CurrentUser { user })
    }
}
