//! Account routes.
//!
//! ```text
//! POST /register   create an account (public)
//! POST /login      sign in (public)
//! GET  /profile    the caller's account
//! PUT  /profile    update the caller's account
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/profile", get(auth::me).put(auth::update_account))
}
