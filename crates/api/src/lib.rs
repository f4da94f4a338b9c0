//! HTTP API server for the character portal.
//!
//! Library crate so integration tests can build the exact router the
//! binary serves, middleware stack included.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
