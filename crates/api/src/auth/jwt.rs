//! JWT session tokens.
//!
//! Tokens carry only the user id; role and active status are read from
//! the database on every request so revocation takes effect without
//! waiting out the expiry.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use portal_core::types::DbId;

/// Default token lifetime.
pub const DEFAULT_TOKEN_EXPIRY_DAYS: i64 = 30;

const DEV_FALLBACK_SECRET: &str = "portal-dev-secret-do-not-use-in-production";

const SECONDS_PER_DAY: i64 = 86_400;

/// Token signing configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC signing secret.
    pub secret: String,
    /// Token lifetime in days.
    pub token_expiry_days: i64,
}

impl JwtConfig {
    /// Load from `JWT_SECRET` and `JWT_EXPIRY_DAYS`.
    ///
    /// A missing secret falls back to a development value and logs a
    /// warning rather than refusing to start.
    pub fn from_env() -> Self {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!(
                    "JWT_SECRET is not set; using an insecure development fallback"
                );
                DEV_FALLBACK_SECRET.to_string()
            }
        };

        let token_expiry_days = std::env::var("JWT_EXPIRY_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_EXPIRY_DAYS);

        Self {
            secret,
            token_expiry_days,
        }
    }
}

/// Claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id the token was issued to.
    pub sub: DbId,
    /// Expiration (unix seconds).
    pub exp: i64,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Unique token id.
    pub jti: String,
}

/// Sign a session token for `user_id`.
pub fn generate_token(
    user_id: DbId,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        exp: now + config.token_expiry_days * SECONDS_PER_DAY,
        iat: now,
        jti: uuid::Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature and expiry, returning the claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
