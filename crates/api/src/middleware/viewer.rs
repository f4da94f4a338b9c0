//! Viewer extractor: resolves the browsing profile for gated read paths.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;

use portal_catalog::service::ViewerContext;
use portal_core::error::CoreError;
use portal_core::types::DbId;
use portal_db::repositories::ProfileRepo;

use crate::error::AppError;
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ViewerParams {
    #[serde(rename = "profileId")]
    profile_id: Option<DbId>,
}

/// Authenticated caller plus the profile named by the `profileId` query
/// parameter, packaged as a catalog [`ViewerContext`].
///
/// Without `profileId` the viewer browses ungated. A `profileId` that
/// does not exist rejects with 404; one owned by another account
/// rejects with 403.
pub struct Viewer(pub ViewerContext);

impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;

        let Query(params) = Query::<ViewerParams>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                AppError::Core(CoreError::Validation(
                    "Invalid profileId query parameter".to_string(),
                ))
            })?;

        let profile = match params.profile_id {
            Some(profile_id) => {
                let profile = ProfileRepo::find_by_id(&state.pool, profile_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Core(CoreError::NotFound {
                            entity: "Profile",
                            id: profile_id.to_string(),
                        })
                    })?;
                if profile.user_id != current.id() {
                    return Err(AppError::Core(CoreError::Forbidden(
                        "Profile does not belong to the authenticated user".to_string(),
                    )));
                }
                Some(profile)
            }
            None => None,
        };

        Ok(Viewer(ViewerContext {
            user_id: current.id(),
            is_admin: current.is_admin(),
            profile,
        }))
    }
}
