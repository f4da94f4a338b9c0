//! HTTP client for the remote character catalog.
//!
//! Wraps the public catalog REST API with a per-request timeout and
//! bounded retries. Failures are surfaced as a single error value; the
//! aggregation layer decides which of them degrade gracefully and which
//! reach the caller.

use std::time::Duration;

use serde::Deserialize;

use portal_core::characters::{CharacterStatus, Gender};
use portal_core::types::Timestamp;

use crate::view::CharacterPlace;

/// Public catalog used when `CATALOG_BASE_URL` is not configured.
pub const DEFAULT_BASE_URL: &str = "https://rickandmortyapi.com/api/character";

/// Highest character id the remote catalog serves. The random sampler
/// draws ids from `1..=MAX_REMOTE_ID`.
pub const MAX_REMOTE_ID: i64 = 826;

/// Per-request timeout for catalog calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// ---------------------------------------------------------------------------
// Retry policy
// ---------------------------------------------------------------------------

/// Backoff strategy for transient catalog failures.
///
/// Attempt `n` (zero-based) sleeps `base_delay * 2^n` before retrying,
/// so the defaults wait 1s and then 2s.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries allowed after the initial attempt.
    pub max_retries: u32,
    /// Backoff unit, doubled on each failed attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting. Used by tests exercising failure paths.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by [`RemoteCatalog`].
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The HTTP request itself failed (connect, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The catalog answered with a non-2xx status.
    #[error("Remote catalog error ({status}): {body}")]
    Status { status: u16, body: String },
}

impl RemoteError {
    /// Whether the catalog reported 404. The upstream 404s both unknown
    /// ids and name searches with zero matches.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::Status { status: 404, .. })
    }

    /// Whether retrying could plausibly succeed: transport failures,
    /// 5xx, and 429. Any other 4xx is a definitive answer.
    fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Request(_) => true,
            RemoteError::Status { status, .. } => *status >= 500 || *status == 429,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One character record as the catalog serializes it. Fields we do not
/// consume (episode list, self URL) are ignored on decode.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCharacter {
    pub id: i64,
    pub name: String,
    pub status: CharacterStatus,
    pub species: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub gender: Gender,
    pub origin: CharacterPlace,
    pub location: CharacterPlace,
    pub image: String,
    pub created: Timestamp,
}

/// Paged search envelope: `{ "info": {...}, "results": [...] }`.
#[derive(Debug, Deserialize)]
pub struct RemotePage {
    pub info: RemotePageInfo,
    pub results: Vec<RemoteCharacter>,
}

#[derive(Debug, Deserialize)]
pub struct RemotePageInfo {
    pub count: i64,
    pub pages: i64,
}

/// `GET /{id1},{id2}` returns a bare object for one id and an array for
/// several; both decode into a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<RemoteCharacter>),
    One(Box<RemoteCharacter>),
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the remote character catalog.
pub struct RemoteCatalog {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl RemoteCatalog {
    /// Client for the catalog rooted at `base_url` (no trailing slash),
    /// e.g. `https://rickandmortyapi.com/api/character`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy. Tests shrink the delays to zero.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Search the catalog by name. `page` selects the upstream page;
    /// `None` lets the catalog serve its first page.
    pub async fn find_by_name(
        &self,
        name: &str,
        page: Option<i64>,
    ) -> Result<RemotePage, RemoteError> {
        let mut query = vec![("name", name.to_string())];
        if let Some(page) = page {
            query.push(("page", page.to_string()));
        }
        self.get_with_retry(&self.base_url, &query).await
    }

    /// Fetch one record by its remote id.
    pub async fn get_by_id(&self, id: i64) -> Result<RemoteCharacter, RemoteError> {
        let url = format!("{}/{id}", self.base_url);
        self.get_with_retry(&url, &[]).await
    }

    /// Fetch several records in one round trip (`GET /{id1},{id2},...`).
    /// An empty id list short-circuits without touching the network.
    pub async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<RemoteCharacter>, RemoteError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}/{joined}", self.base_url);
        let batch: OneOrMany = self.get_with_retry(&url, &[]).await?;
        Ok(match batch {
            OneOrMany::Many(records) => records,
            OneOrMany::One(record) => vec![*record],
        })
    }

    /// GET `url` and decode the JSON body, retrying transient failures
    /// per the configured policy.
    async fn get_with_retry<T>(&self, url: &str, query: &[(&str, String)]) -> Result<T, RemoteError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut attempt: u32 = 0;
        loop {
            match self.get_json(url, query).await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.base_delay * 2u32.pow(attempt);
                    attempt += 1;
                    tracing::warn!(
                        url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        %error,
                        "Remote catalog request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Single GET attempt.
    async fn get_json<T>(&self, url: &str, query: &[(&str, String)]) -> Result<T, RemoteError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut request = self.client.get(url).timeout(REQUEST_TIMEOUT);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;
        Self::parse_response(response).await
    }

    /// Check that the response status indicates success, preserving the
    /// body text of failures for logging.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful response body into the expected type.
    async fn parse_response<T>(response: reqwest::Response) -> Result<T, RemoteError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
