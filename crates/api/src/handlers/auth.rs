//! Account handlers: registration, login, self-view, self-update.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use portal_core::error::CoreError;
use portal_core::gating::ProfileKind;
use portal_core::profiles;
use portal_core::types::DbId;
use portal_db::models::profile::{CreateProfile, Profile};
use portal_db::models::user::{CreateUser, UpdateAccount, User};
use portal_db::repositories::{ProfileRepo, UserRepo};

use crate::auth::jwt::generate_token;
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

// --- Request / response types ----------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public view of a user account. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
    pub profiles: Vec<Profile>,
}

/// Self-view: the account plus its viewing profiles, no token.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserInfo,
    pub profiles: Vec<Profile>,
}

fn user_info(user: &User) -> UserInfo {
    UserInfo {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role.clone(),
    }
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// --- Handlers ---------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Creates the account together with its default viewing profile and
/// signs the caller in.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    // 1. Validate input
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Name is required".to_string(),
        )));
    }

    let email = normalize_email(&input.email);
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "A valid email is required".to_string(),
        )));
    }

    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|message| AppError::Core(CoreError::Validation(message)))?;

    // 2. Reject duplicate emails early; the unique constraint backstops
    //    concurrent registrations.
    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Email is already registered".to_string(),
        )));
    }

    // 3. Create the account
    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: name.to_string(),
            email,
            password_hash,
        },
    )
    .await?;

    // 4. Every account starts with one adult profile
    let profile = ProfileRepo::create(
        &state.pool,
        &CreateProfile {
            user_id: user.id,
            name: profiles::default_profile_name(&user.name),
            avatar: profiles::DEFAULT_PROFILE_AVATAR.to_string(),
            age: profiles::default_age(ProfileKind::Adult),
            kind: ProfileKind::Adult,
        },
    )
    .await?;

    // 5. Sign the caller in
    let token = generate_token(user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, "User registered");

    let response = AuthResponse {
        token,
        user: user_info(&user),
        profiles: vec![profile],
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    // Unknown email and wrong password produce the same response.
    let invalid =
        || AppError::Core(CoreError::Unauthorized("Invalid email or password".to_string()));

    let email = normalize_email(&input.email);
    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(invalid)?;

    let password_ok = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;
    if !password_ok {
        return Err(invalid());
    }

    let profiles = ProfileRepo::list_by_user(&state.pool, user.id).await?;
    let token = generate_token(user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse {
        token,
        user: user_info(&user),
        profiles,
    }))
}

/// GET /api/v1/auth/profile
///
/// The caller's own account record with its profiles.
pub async fn me(State(state): State<AppState>, current: CurrentUser) -> AppResult<Json<MeResponse>> {
    let profiles = ProfileRepo::list_by_user(&state.pool, current.id()).await?;
    Ok(Json(MeResponse {
        user: user_info(&current.user),
        profiles,
    }))
}

/// PUT /api/v1/auth/profile
///
/// Partial account update. Issues a fresh token; previously issued
/// tokens stay valid until they expire.
pub async fn update_account(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<UpdateAccountRequest>,
) -> AppResult<Json<AuthResponse>> {
    let name = match input.name.as_deref().map(str::trim) {
        Some("") => {
            return Err(AppError::Core(CoreError::Validation(
                "Name cannot be empty".to_string(),
            )))
        }
        other => other.map(str::to_string),
    };

    let email = match input.email.as_deref().map(normalize_email) {
        Some(candidate) if candidate.is_empty() || !candidate.contains('@') => {
            return Err(AppError::Core(CoreError::Validation(
                "A valid email is required".to_string(),
            )))
        }
        other => other,
    };
    if let Some(candidate) = &email {
        if let Some(existing) = UserRepo::find_by_email(&state.pool, candidate).await? {
            if existing.id != current.id() {
                return Err(AppError::Core(CoreError::Conflict(
                    "Email is already registered".to_string(),
                )));
            }
        }
    }

    let password_hash = match input.password.as_deref() {
        Some(password) => {
            validate_password_strength(password, MIN_PASSWORD_LENGTH)
                .map_err(|message| AppError::Core(CoreError::Validation(message)))?;
            Some(
                hash_password(password)
                    .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?,
            )
        }
        None => None,
    };

    let update = UpdateAccount {
        name,
        email,
        password_hash,
    };
    let user = UserRepo::update_account(&state.pool, current.id(), &update)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "User",
                id: current.id().to_string(),
            })
        })?;

    let profiles = ProfileRepo::list_by_user(&state.pool, user.id).await?;
    let token = generate_token(user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    Ok(Json(AuthResponse {
        token,
        user: user_info(&user),
        profiles,
    }))
}
