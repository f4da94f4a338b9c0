//! Server configuration loaded from the environment.

use crate::auth::jwt::JwtConfig;

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind, e.g. `0.0.0.0`.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Origins allowed by the CORS layer.
    pub cors_origins: Vec<String>,
    /// Per-request timeout enforced by the middleware stack.
    pub request_timeout_secs: u64,
    /// Base URL of the remote character catalog.
    pub catalog_base_url: String,
    /// Token signing configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable               | Default                                      |
    /// |------------------------|----------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                    |
    /// | `PORT`                 | `5000`                                       |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` (comma-separated)    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                         |
    /// | `CATALOG_BASE_URL`     | the public Rick and Morty character endpoint |
    /// | `JWT_SECRET`           | development fallback (logs a warning)        |
    /// | `JWT_EXPIRY_DAYS`      | `30`                                         |
    ///
    /// # Panics
    ///
    /// Panics when a numeric variable is present but unparseable; a
    /// misconfigured server should fail at startup, not at request time.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let catalog_base_url = std::env::var("CATALOG_BASE_URL")
            .unwrap_or_else(|_| portal_catalog::remote::DEFAULT_BASE_URL.to_string());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            catalog_base_url,
            jwt: JwtConfig::from_env(),
        }
    }
}
