//! Character handlers: merged listing, search, random picks, CRUD for
//! custom characters.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use portal_catalog::service::{CharacterPage, ListQuery, Source};
use portal_catalog::view::{CharacterView, CreatorInfo};
use portal_core::characters::{self, CharacterStatus, Gender};
use portal_core::error::CoreError;
use portal_core::gating::AgeTag;
use portal_core::refs::CharacterRef;
use portal_core::types::DbId;
use portal_db::models::character::{CreateCharacter, UpdateCharacter};
use portal_db::repositories::CharacterRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::middleware::viewer::Viewer;
use crate::state::AppState;

// --- Request / response types ----------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub name: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub source: Source,
    #[serde(rename = "showAll", default)]
    pub show_all: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
    #[serde(rename = "showAll", default)]
    pub show_all: bool,
}

#[derive(Debug, Deserialize)]
pub struct RandomParams {
    pub count: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCharacterRequest {
    pub name: String,
    pub species: String,
    pub status: Option<CharacterStatus>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub gender: Option<Gender>,
    pub origin_name: Option<String>,
    pub location_name: Option<String>,
    pub image: Option<String>,
    pub age_restriction: Option<AgeTag>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCharacterRequest {
    pub name: Option<String>,
    pub species: Option<String>,
    pub status: Option<CharacterStatus>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub gender: Option<Gender>,
    pub origin_name: Option<String>,
    pub location_name: Option<String>,
    pub image: Option<String>,
    pub age_restriction: Option<AgeTag>,
}

// --- Helpers ----------------------------------------------------------------

fn character_not_found(reference: &str) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Character",
        id: reference.to_string(),
    })
}

/// Resolve a path reference that must name a locally stored character.
fn require_local(raw: &str) -> Result<DbId, AppError> {
    match raw.parse::<CharacterRef>()? {
        CharacterRef::Local(id) => Ok(id),
        CharacterRef::Remote(_) => Err(AppError::Core(CoreError::Validation(
            "Only custom characters can be modified".to_string(),
        ))),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// --- Handlers ---------------------------------------------------------------

/// GET /api/v1/characters
///
/// Merged listing over the local store and the remote catalog. See
/// [`portal_catalog::CatalogService::list`] for the merge and paging
/// rules.
pub async fn list(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Query(params): Query<ListParams>,
) -> AppResult<Json<CharacterPage>> {
    let query = ListQuery {
        name: params.name,
        page: params.page,
        limit: params.limit,
        source: params.source,
        show_all: params.show_all,
    };
    let page = state.catalog.list(&state.pool, &viewer, &query).await?;
    Ok(Json(page))
}

/// GET /api/v1/characters/search
///
/// Unpaginated name search across both sources. `name` is required.
pub async fn search(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<CharacterView>>> {
    let name = params
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "Query parameter 'name' is required".to_string(),
            ))
        })?;

    let results = state
        .catalog
        .search(&state.pool, &viewer, name, params.show_all)
        .await?;
    Ok(Json(results))
}

/// GET /api/v1/characters/random
pub async fn random(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Query(params): Query<RandomParams>,
) -> AppResult<Json<Vec<CharacterView>>> {
    let characters = state.catalog.random(&viewer, params.count).await?;
    Ok(Json(characters))
}

/// GET /api/v1/characters/{id}
///
/// Accepts both id spaces: `42` fetches a stored row, `api-7` fetches
/// from the remote catalog.
pub async fn get_by_id(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(raw_reference): Path<String>,
) -> AppResult<Json<CharacterView>> {
    let reference: CharacterRef = raw_reference.parse()?;
    let view = state.catalog.get(&state.pool, &viewer, reference).await?;
    Ok(Json(view))
}

/// POST /api/v1/characters
///
/// Creates a custom character owned by the caller. Omitted fields take
/// the catalog-compatible defaults, so the stored row round-trips
/// exactly through the read paths.
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<CreateCharacterRequest>,
) -> AppResult<(StatusCode, Json<CharacterView>)> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Name is required".to_string(),
        )));
    }
    let species = input.species.trim();
    if species.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Species is required".to_string(),
        )));
    }

    let character = CharacterRepo::create(
        &state.pool,
        &CreateCharacter {
            name: name.to_string(),
            status: input.status.unwrap_or_default(),
            species: species.to_string(),
            kind: input.kind.unwrap_or_default(),
            gender: input.gender.unwrap_or_default(),
            origin_name: non_empty(input.origin_name)
                .unwrap_or_else(|| characters::DEFAULT_PLACE_NAME.to_string()),
            location_name: non_empty(input.location_name)
                .unwrap_or_else(|| characters::DEFAULT_PLACE_NAME.to_string()),
            image: non_empty(input.image)
                .unwrap_or_else(|| characters::DEFAULT_CHARACTER_IMAGE.to_string()),
            age_restriction: input.age_restriction.unwrap_or(AgeTag::All),
            creator_id: current.id(),
        },
    )
    .await?;

    let creator = CreatorInfo {
        id: current.id(),
        name: current.user.name.clone(),
    };
    let view = CharacterView::from_custom(character, Some(creator));
    Ok((StatusCode::CREATED, Json(view)))
}

/// PUT /api/v1/characters/{id}
///
/// Only the creator or an admin may modify a character. Remote catalog
/// records are read-only.
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(raw_reference): Path<String>,
    Json(input): Json<UpdateCharacterRequest>,
) -> AppResult<Json<CharacterView>> {
    let id = require_local(&raw_reference)?;

    let existing = CharacterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| character_not_found(&raw_reference))?;

    if existing.creator_id != current.id() && !current.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the creator or an admin can modify this character".to_string(),
        )));
    }

    if input.name.as_deref().map(str::trim) == Some("") {
        return Err(AppError::Core(CoreError::Validation(
            "Name cannot be empty".to_string(),
        )));
    }
    if input.species.as_deref().map(str::trim) == Some("") {
        return Err(AppError::Core(CoreError::Validation(
            "Species cannot be empty".to_string(),
        )));
    }

    let update = UpdateCharacter {
        name: input.name.map(|n| n.trim().to_string()),
        status: input.status,
        species: input.species.map(|s| s.trim().to_string()),
        kind: input.kind,
        gender: input.gender,
        origin_name: input.origin_name,
        location_name: input.location_name,
        image: input.image,
        age_restriction: input.age_restriction,
    };
    CharacterRepo::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| character_not_found(&raw_reference))?;

    // Cached favorites may embed the old field values.
    state.catalog.invalidate_all_favorites().await;

    let row = CharacterRepo::find_with_creator(&state.pool, id)
        .await?
        .ok_or_else(|| character_not_found(&raw_reference))?;
    Ok(Json(CharacterView::from_custom_with_creator(row)))
}

/// DELETE /api/v1/characters/{id}
pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(raw_reference): Path<String>,
) -> AppResult<StatusCode> {
    let id = require_local(&raw_reference)?;

    let existing = CharacterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| character_not_found(&raw_reference))?;

    if existing.creator_id != current.id() && !current.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the creator or an admin can delete this character".to_string(),
        )));
    }

    CharacterRepo::delete(&state.pool, id).await?;

    // Dangling favorites entries are tolerated by resolution, but the
    // cache may still hold the deleted character's view.
    state.catalog.invalidate_all_favorites().await;

    Ok(StatusCode::NO_CONTENT)
}
