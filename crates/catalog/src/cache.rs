//! Short-lived cache of resolved favorites lists.
//!
//! Resolving a favorites list can fan out to the remote catalog, so the
//! resolved views are memoized per profile for a short TTL. The cache is
//! owned by the aggregation service and handed around explicitly; tests
//! construct their own instances with tiny TTLs.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use portal_core::types::DbId;

use crate::view::CharacterView;

/// How long a resolved favorites list stays fresh.
pub const FAVORITES_CACHE_TTL: Duration = Duration::from_secs(30);

struct CacheEntry {
    cached_at: Instant,
    views: Vec<CharacterView>,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() < ttl
    }
}

/// TTL cache of resolved favorites, keyed by profile id.
pub struct FavoritesCache {
    entries: RwLock<HashMap<DbId, CacheEntry>>,
    ttl: Duration,
}

impl FavoritesCache {
    pub fn new() -> Self {
        Self::with_ttl(FAVORITES_CACHE_TTL)
    }

    /// Cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Fresh entry for `profile_id`, if any.
    pub async fn get(&self, profile_id: DbId) -> Option<Vec<CharacterView>> {
        let entries = self.entries.read().await;
        entries
            .get(&profile_id)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.views.clone())
    }

    /// Store the resolved list for `profile_id`.
    pub async fn insert(&self, profile_id: DbId, views: Vec<CharacterView>) {
        let mut entries = self.entries.write().await;
        entries.insert(
            profile_id,
            CacheEntry {
                cached_at: Instant::now(),
                views,
            },
        );
    }

    /// Drop the entry for one profile. Called when its favorites list or
    /// the profile itself changes.
    pub async fn invalidate(&self, profile_id: DbId) {
        self.entries.write().await.remove(&profile_id);
    }

    /// Drop every entry. Called when a custom character changes, since
    /// any profile's cached views may embed it.
    pub async fn invalidate_all(&self) {
        self.entries.write().await.clear();
    }

    /// Remove expired entries, returning how many were dropped. Driven
    /// by the background sweeper.
    pub async fn prune_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.is_fresh(ttl));
        before - entries.len()
    }
}

impl Default for FavoritesCache {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
