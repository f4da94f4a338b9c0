//! Periodic eviction of expired favorites-cache entries.
//!
//! Entries expire on their own TTL; this sweep only reclaims the memory
//! of entries nothing has read since they went stale. Runs on a fixed
//! interval using `tokio::time::interval`.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use portal_catalog::CatalogService;

/// How often the sweep runs.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Run the favorites-cache sweep loop until `cancel` is triggered.
pub async fn run(catalog: Arc<CatalogService>, cancel: CancellationToken) {
    let sweep_interval_secs: u64 = std::env::var("FAVORITES_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);

    tracing::info!(
        interval_secs = sweep_interval_secs,
        "Favorites cache sweeper started"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(sweep_interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Favorites cache sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                let pruned = catalog.prune_favorites_cache().await;
                if pruned > 0 {
                    tracing::debug!(pruned, "Favorites sweep: evicted expired entries");
                }
            }
        }
    }
}
