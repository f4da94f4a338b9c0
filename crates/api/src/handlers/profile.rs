//! Viewing-profile handlers, including the favorites sub-resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use portal_catalog::view::CharacterView;
use portal_core::error::CoreError;
use portal_core::gating::{AgeTag, ProfileKind};
use portal_core::profiles::{self, MAX_PROFILES_PER_USER};
use portal_core::refs::CharacterRef;
use portal_core::types::DbId;
use portal_db::models::profile::{CreateProfile, Profile, UpdateProfile};
use portal_db::repositories::{CharacterRepo, ProfileRepo};
use portal_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

// --- Request / response types ----------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub name: String,
    pub avatar: Option<String>,
    pub age: Option<i32>,
    #[serde(rename = "type")]
    pub kind: Option<ProfileKind>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub age: Option<i32>,
    #[serde(rename = "type")]
    pub kind: Option<ProfileKind>,
}

// --- Helpers ----------------------------------------------------------------

/// Load a profile and verify it belongs to `user_id`.
async fn load_owned(pool: &DbPool, user_id: DbId, profile_id: DbId) -> Result<Profile, AppError> {
    let profile = ProfileRepo::find_by_id(pool, profile_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Profile",
                id: profile_id.to_string(),
            })
        })?;

    if profile.user_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Profile does not belong to the authenticated user".to_string(),
        )));
    }
    Ok(profile)
}

fn profile_not_found(profile_id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Profile",
        id: profile_id.to_string(),
    })
}

// --- Handlers ---------------------------------------------------------------

/// GET /api/v1/profiles
pub async fn list(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<Json<Vec<Profile>>> {
    let profiles = ProfileRepo::list_by_user(&state.pool, current.id()).await?;
    Ok(Json(profiles))
}

/// GET /api/v1/profiles/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Profile>> {
    let profile = load_owned(&state.pool, current.id(), id).await?;
    Ok(Json(profile))
}

/// POST /api/v1/profiles
///
/// Accounts are capped at five profiles. Age defaults to 18 for adult
/// profiles and 12 for child profiles.
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<CreateProfileRequest>,
) -> AppResult<(StatusCode, Json<Profile>)> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Profile name is required".to_string(),
        )));
    }
    if let Some(age) = input.age {
        if age < 0 {
            return Err(AppError::Core(CoreError::Validation(
                "Age cannot be negative".to_string(),
            )));
        }
    }

    let count = ProfileRepo::count_for_user(&state.pool, current.id()).await?;
    if count >= MAX_PROFILES_PER_USER {
        return Err(AppError::BadRequest(format!(
            "A user can have at most {MAX_PROFILES_PER_USER} profiles"
        )));
    }

    let kind = input.kind.unwrap_or(ProfileKind::Adult);
    let profile = ProfileRepo::create(
        &state.pool,
        &CreateProfile {
            user_id: current.id(),
            name: name.to_string(),
            avatar: input
                .avatar
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| profiles::DEFAULT_PROFILE_AVATAR.to_string()),
            age: input.age.unwrap_or_else(|| profiles::default_age(kind)),
            kind,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// PUT /api/v1/profiles/{id}
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<Profile>> {
    load_owned(&state.pool, current.id(), id).await?;

    let name = match input.name.as_deref().map(str::trim) {
        Some("") => {
            return Err(AppError::Core(CoreError::Validation(
                "Profile name cannot be empty".to_string(),
            )))
        }
        other => other.map(str::to_string),
    };
    if let Some(age) = input.age {
        if age < 0 {
            return Err(AppError::Core(CoreError::Validation(
                "Age cannot be negative".to_string(),
            )));
        }
    }

    let update = UpdateProfile {
        name,
        avatar: input.avatar,
        age: input.age,
        kind: input.kind,
    };
    let profile = ProfileRepo::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| profile_not_found(id))?;

    // A kind change alters what the cached favorites may show.
    state.catalog.invalidate_favorites(id).await;

    Ok(Json(profile))
}

/// DELETE /api/v1/profiles/{id}
///
/// The last remaining profile of an account cannot be deleted.
pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_owned(&state.pool, current.id(), id).await?;

    let count = ProfileRepo::count_for_user(&state.pool, current.id()).await?;
    if count <= 1 {
        return Err(AppError::BadRequest(
            "Cannot delete the only profile".to_string(),
        ));
    }

    let deleted = ProfileRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(profile_not_found(id));
    }

    state.catalog.invalidate_favorites(id).await;

    Ok(StatusCode::NO_CONTENT)
}

// --- Favorites --------------------------------------------------------------

/// GET /api/v1/profiles/{id}/favorites
///
/// Favorites resolved into full character views, in stored order.
pub async fn list_favorites(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<CharacterView>>> {
    let profile = load_owned(&state.pool, current.id(), id).await?;
    let views = state.catalog.favorites(&state.pool, &profile).await?;
    Ok(Json(views))
}

/// POST /api/v1/profiles/{id}/favorites/{character_id}
///
/// Local references must name an existing character; remote references
/// are accepted without a catalog round trip since their age tag is
/// derived from the id alone. Child profiles cannot favorite
/// adult-tagged characters from either source.
pub async fn add_favorite(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, raw_reference)): Path<(DbId, String)>,
) -> AppResult<Json<Profile>> {
    let profile = load_owned(&state.pool, current.id(), id).await?;
    let reference: CharacterRef = raw_reference.parse()?;
    let canonical = reference.to_string();

    if profile.favorites.iter().any(|entry| *entry == canonical) {
        return Err(AppError::Core(CoreError::Conflict(
            "Character is already in favorites".to_string(),
        )));
    }

    let tag = match reference {
        CharacterRef::Local(character_id) => {
            let character = CharacterRepo::find_by_id(&state.pool, character_id)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::NotFound {
                        entity: "Character",
                        id: canonical.clone(),
                    })
                })?;
            character.age_restriction
        }
        CharacterRef::Remote(remote_id) => AgeTag::for_remote_id(remote_id),
    };
    if !profile.kind.may_view(tag) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Character not available on a child profile".to_string(),
        )));
    }

    let updated = ProfileRepo::add_favorite(&state.pool, id, &canonical)
        .await?
        .ok_or_else(|| profile_not_found(id))?;

    state.catalog.invalidate_favorites(id).await;

    Ok(Json(updated))
}

/// DELETE /api/v1/profiles/{id}/favorites/{character_id}
pub async fn remove_favorite(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, raw_reference)): Path<(DbId, String)>,
) -> AppResult<Json<Profile>> {
    let profile = load_owned(&state.pool, current.id(), id).await?;
    let reference: CharacterRef = raw_reference.parse()?;
    let canonical = reference.to_string();

    if !profile.favorites.iter().any(|entry| *entry == canonical) {
        return Err(AppError::BadRequest(
            "Character is not in favorites".to_string(),
        ));
    }

    let updated = ProfileRepo::remove_favorite(&state.pool, id, &canonical)
        .await?
        .ok_or_else(|| profile_not_found(id))?;

    state.catalog.invalidate_favorites(id).await;

    Ok(Json(updated))
}
