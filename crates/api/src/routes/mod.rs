//! Route tree assembly.

pub mod auth;
pub mod character;
pub mod health;
pub mod profile;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register                          register (public)
/// /auth/login                             login (public)
/// /auth/profile                           account self-view / self-update
///
/// /characters                             merged listing, create custom
/// /characters/random                      random remote sample
/// /characters/search                      merged name search
/// /characters/{id}                        get / update / delete ("42" or "api-7")
///
/// /profiles                               list, create
/// /profiles/{id}                          get / update / delete
/// /profiles/{id}/favorites                resolved favorites list
/// /profiles/{id}/favorites/{character_id} add (POST) / remove (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/characters", character::router())
        .nest("/profiles", profile::router())
}
