//! Shared application state.

use std::sync::Arc;

use portal_catalog::CatalogService;
use portal_db::DbPool;

use crate::config::ServerConfig;
use crate::middleware::track::RequestGauge;

/// State shared across all request handlers.
///
/// Cloned per request by axum; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Merged local/remote character catalog.
    pub catalog: Arc<CatalogService>,
    /// In-flight request counter, reported by the health endpoint.
    pub request_gauge: RequestGauge,
}
