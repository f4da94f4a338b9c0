//! Profile routes.
//!
//! ```text
//! GET    /                              list the caller's profiles
//! POST   /                              create a profile
//! GET    /{id}                          fetch one profile
//! PUT    /{id}                          update a profile
//! DELETE /{id}                          delete a profile
//! GET    /{id}/favorites                favorites resolved to views
//! POST   /{id}/favorites/{character_id} add a favorite
//! DELETE /{id}/favorites/{character_id} remove a favorite
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::profile;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::list).post(profile::create))
        .route(
            "/{id}",
            get(profile::get_by_id)
                .put(profile::update)
                .delete(profile::delete),
        )
        .route("/{id}/favorites", get(profile::list_favorites))
        .route(
            "/{id}/favorites/{character_id}",
            post(profile::add_favorite).delete(profile::remove_favorite),
        )
}
