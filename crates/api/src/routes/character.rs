//! Character routes.
//!
//! ```text
//! GET    /          merged listing (local + remote)
//! POST   /          create a custom character
//! GET    /random    random remote sample
//! GET    /search    merged name search
//! GET    /{id}      fetch from either id space
//! PUT    /{id}      update a custom character
//! DELETE /{id}      delete a custom character
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::character;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(character::list).post(character::create))
        .route("/random", get(character::random))
        .route("/search", get(character::search))
        .route(
            "/{id}",
            get(character::get_by_id)
                .put(character::update)
                .delete(character::delete),
        )
}
