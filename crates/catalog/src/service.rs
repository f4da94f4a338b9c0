//! Aggregation and gating over the two character sources.
//!
//! [`CatalogService`] merges the local custom-character store with the
//! remote catalog and applies the viewer's age gate on every read path.
//! Remote failures degrade to local-only results on listings and
//! favorites; purely remote reads (direct fetch, random sample) surface
//! them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use portal_core::error::CoreError;
use portal_core::gating::{AgeTag, ProfileKind};
use portal_core::pagination;
use portal_core::refs::{partition_refs, CharacterRef};
use portal_core::types::DbId;
use portal_db::models::character::{CharacterFilter, CharacterWithCreator};
use portal_db::models::profile::Profile;
use portal_db::repositories::CharacterRepo;

use crate::cache::FavoritesCache;
use crate::remote::{RemoteCatalog, RemoteCharacter, RemoteError, MAX_REMOTE_ID};
use crate::view::CharacterView;

/// Sample size for the random endpoint when the caller names none.
pub const DEFAULT_RANDOM_COUNT: i64 = 5;

/// Largest random sample a single request may ask for.
pub const MAX_RANDOM_COUNT: i64 = 20;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the aggregation layer.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] sqlx::Error),

    /// Remote failure on a path that cannot degrade to local results.
    #[error("Remote catalog unavailable: {0}")]
    Remote(#[from] RemoteError),
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Who is asking: the account plus the optionally selected viewing
/// profile. Built by the HTTP layer after token and ownership checks.
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub user_id: DbId,
    pub is_admin: bool,
    /// Profile selected for browsing; `None` browses ungated, like an
    /// adult profile.
    pub profile: Option<Profile>,
}

impl ViewerContext {
    pub fn kind(&self) -> ProfileKind {
        self.profile.as_ref().map_or(ProfileKind::Adult, |p| p.kind)
    }

    pub fn is_child(&self) -> bool {
        self.kind().is_child()
    }

    pub fn may_view(&self, tag: AgeTag) -> bool {
        self.kind().may_view(tag)
    }
}

/// Which sources a listing draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    All,
    Custom,
    Api,
}

impl Source {
    fn includes_local(self) -> bool {
        matches!(self, Source::All | Source::Custom)
    }

    fn includes_remote(self) -> bool {
        matches!(self, Source::All | Source::Api)
    }
}

/// Listing parameters as the handler received them; clamping happens
/// here so every caller gets the same bounds.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub name: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub source: Source,
    pub show_all: bool,
}

/// One page of merged results.
#[derive(Debug, Serialize)]
pub struct CharacterPage {
    pub characters: Vec<CharacterView>,
    pub page: i64,
    /// Page count of local rows at this page size; remote matches are
    /// appended to `characters` without affecting the pager.
    pub pages: i64,
    /// Length of `characters`, local plus remote.
    pub total: i64,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Merges the local character store with the remote catalog.
pub struct CatalogService {
    remote: RemoteCatalog,
    favorites: FavoritesCache,
}

impl CatalogService {
    pub fn new(remote: RemoteCatalog) -> Self {
        Self {
            remote,
            favorites: FavoritesCache::new(),
        }
    }

    /// Service with a caller-provided cache (tests shrink the TTL).
    pub fn with_cache(remote: RemoteCatalog, favorites: FavoritesCache) -> Self {
        Self { remote, favorites }
    }

    /// Merged character listing.
    ///
    /// The local leg is paginated and scoped to the caller's own rows
    /// unless `show_all` is set. The remote leg joins in only when a
    /// name filter is present, forwarding the same page number. Child
    /// viewers never receive adult-tagged entries from either leg.
    pub async fn list(
        &self,
        pool: &PgPool,
        viewer: &ViewerContext,
        query: &ListQuery,
    ) -> Result<CharacterPage, CatalogError> {
        let page = pagination::clamp_page(query.page);
        let limit = pagination::clamp_limit(query.limit);
        let name = query.name.as_deref().filter(|n| !n.is_empty());

        let mut characters = Vec::new();
        let mut local_total = 0;

        if query.source.includes_local() {
            let filter = CharacterFilter {
                name: name.map(str::to_string),
                creator_id: (!query.show_all).then_some(viewer.user_id),
                all_ages_only: viewer.is_child(),
            };
            let offset = pagination::offset(page, limit);
            let rows = CharacterRepo::search(pool, &filter, Some(limit), offset).await?;
            local_total = CharacterRepo::count(pool, &filter).await?;
            characters.extend(rows.into_iter().map(CharacterView::from_custom_with_creator));
        }

        if query.source.includes_remote() {
            if let Some(name) = name {
                match self.remote.find_by_name(name, Some(page)).await {
                    Ok(remote_page) => characters.extend(
                        remote_page
                            .results
                            .into_iter()
                            .filter(|record| viewer.may_view(AgeTag::for_remote_id(record.id)))
                            .map(CharacterView::from_remote),
                    ),
                    // The catalog 404s a search with zero matches; that is
                    // an answer, not an outage.
                    Err(error) if error.is_not_found() => {}
                    Err(error) => tracing::warn!(
                        %error,
                        "Remote catalog unavailable, listing local results only"
                    ),
                }
            }
        }

        let total = characters.len() as i64;
        Ok(CharacterPage {
            characters,
            page,
            pages: pagination::page_count(local_total, limit),
            total,
        })
    }

    /// Name search merged across both sources, unpaginated.
    ///
    /// The local leg is scoped to the caller's own rows unless `show_all`
    /// is set or the caller is an admin. The remote leg takes the
    /// upstream's first page for the name, degrading to local-only on
    /// failure like [`CatalogService::list`].
    pub async fn search(
        &self,
        pool: &PgPool,
        viewer: &ViewerContext,
        name: &str,
        show_all: bool,
    ) -> Result<Vec<CharacterView>, CatalogError> {
        let filter = CharacterFilter {
            name: Some(name.to_string()),
            creator_id: if show_all || viewer.is_admin {
                None
            } else {
                Some(viewer.user_id)
            },
            all_ages_only: viewer.is_child(),
        };
        let rows = CharacterRepo::search(pool, &filter, None, 0).await?;
        let mut results: Vec<CharacterView> = rows
            .into_iter()
            .map(CharacterView::from_custom_with_creator)
            .collect();

        match self.remote.find_by_name(name, None).await {
            Ok(remote_page) => results.extend(
                remote_page
                    .results
                    .into_iter()
                    .filter(|record| viewer.may_view(AgeTag::for_remote_id(record.id)))
                    .map(CharacterView::from_remote),
            ),
            Err(error) if error.is_not_found() => {}
            Err(error) => tracing::warn!(
                %error,
                "Remote catalog unavailable, searching local characters only"
            ),
        }

        Ok(results)
    }

    /// Fetch one character from whichever source the reference names.
    pub async fn get(
        &self,
        pool: &PgPool,
        viewer: &ViewerContext,
        reference: CharacterRef,
    ) -> Result<CharacterView, CatalogError> {
        let view = match reference {
            CharacterRef::Local(id) => {
                let row = CharacterRepo::find_with_creator(pool, id)
                    .await?
                    .ok_or_else(|| not_found(reference))?;
                CharacterView::from_custom_with_creator(row)
            }
            CharacterRef::Remote(id) => match self.remote.get_by_id(id).await {
                Ok(record) => CharacterView::from_remote(record),
                Err(error) if error.is_not_found() => return Err(not_found(reference).into()),
                Err(error) => return Err(error.into()),
            },
        };

        if !viewer.may_view(view.age_restriction) {
            return Err(
                CoreError::Forbidden("Character not available on a child profile".to_string())
                    .into(),
            );
        }
        Ok(view)
    }

    /// Random sample of remote characters.
    ///
    /// Draws distinct ids across the catalog's id range in one batch
    /// fetch. Ids a child viewer may not see are dropped before the
    /// fetch, so the sample may come back smaller than requested.
    pub async fn random(
        &self,
        viewer: &ViewerContext,
        count: Option<i64>,
    ) -> Result<Vec<CharacterView>, CatalogError> {
        let mut ids = random_remote_ids(clamp_random_count(count));
        ids.retain(|id| viewer.may_view(AgeTag::for_remote_id(*id)));

        let records = self.remote.get_by_ids(&ids).await?;
        Ok(records.into_iter().map(CharacterView::from_remote).collect())
    }

    /// Resolve a profile's favorites into full character views, gated by
    /// the profile's own kind. Results are cached briefly per profile; a
    /// remote failure degrades to the local favorites only.
    pub async fn favorites(
        &self,
        pool: &PgPool,
        profile: &Profile,
    ) -> Result<Vec<CharacterView>, CatalogError> {
        if let Some(views) = self.favorites.get(profile.id).await {
            return Ok(views);
        }

        let (local_ids, remote_ids) = partition_refs(&profile.favorites);
        let mut views = Vec::with_capacity(profile.favorites.len());

        if !local_ids.is_empty() {
            let rows = CharacterRepo::find_by_ids_with_creator(pool, &local_ids).await?;
            let mut by_id: HashMap<DbId, CharacterWithCreator> = rows
                .into_iter()
                .map(|row| (row.character.id, row))
                .collect();
            // Re-order to the stored favorites order; `remove` also
            // collapses any duplicate references.
            views.extend(
                local_ids
                    .iter()
                    .filter_map(|id| by_id.remove(id))
                    .filter(|row| profile.kind.may_view(row.character.age_restriction))
                    .map(CharacterView::from_custom_with_creator),
            );
        }

        match self.remote.get_by_ids(&remote_ids).await {
            Ok(records) => {
                let mut by_id: HashMap<i64, RemoteCharacter> = records
                    .into_iter()
                    .map(|record| (record.id, record))
                    .collect();
                views.extend(
                    remote_ids
                        .iter()
                        .filter_map(|id| by_id.remove(id))
                        .filter(|record| profile.kind.may_view(AgeTag::for_remote_id(record.id)))
                        .map(CharacterView::from_remote),
                );
            }
            Err(error) => tracing::warn!(
                profile_id = profile.id,
                %error,
                "Remote catalog unavailable, favorites resolved from local store only"
            ),
        }

        self.favorites.insert(profile.id, views.clone()).await;
        Ok(views)
    }

    /// Drop the cached favorites for one profile.
    pub async fn invalidate_favorites(&self, profile_id: DbId) {
        self.favorites.invalidate(profile_id).await;
    }

    /// Drop every cached favorites list.
    pub async fn invalidate_all_favorites(&self) {
        self.favorites.invalidate_all().await;
    }

    /// Evict expired favorites entries. Driven by the background sweeper.
    pub async fn prune_favorites_cache(&self) -> usize {
        self.favorites.prune_expired().await
    }
}

fn not_found(reference: CharacterRef) -> CoreError {
    CoreError::NotFound {
        entity: "Character",
        id: reference.to_string(),
    }
}

fn clamp_random_count(count: Option<i64>) -> usize {
    count.unwrap_or(DEFAULT_RANDOM_COUNT).clamp(1, MAX_RANDOM_COUNT) as usize
}

/// Distinct uniformly random ids in the remote catalog's id range.
fn random_remote_ids(count: usize) -> Vec<i64> {
    let mut rng = rand::rng();
    rand::seq::index::sample(&mut rng, MAX_REMOTE_ID as usize, count)
        .into_iter()
        .map(|index| index as i64 + 1)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(kind: ProfileKind) -> Profile {
        Profile {
            id: 1,
            user_id: 1,
            name: "Test Profile".to_string(),
            avatar: String::new(),
            age: 18,
            kind,
            favorites: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    // -- viewer context ------------------------------------------------------

    #[test]
    fn viewer_without_profile_is_ungated() {
        let viewer = ViewerContext {
            user_id: 1,
            is_admin: false,
            profile: None,
        };
        assert!(!viewer.is_child());
        assert!(viewer.may_view(AgeTag::Adult));
    }

    #[test]
    fn child_profile_gates_the_viewer() {
        let viewer = ViewerContext {
            user_id: 1,
            is_admin: false,
            profile: Some(profile(ProfileKind::Child)),
        };
        assert!(viewer.is_child());
        assert!(viewer.may_view(AgeTag::All));
        assert!(!viewer.may_view(AgeTag::Adult));
    }

    // -- source param --------------------------------------------------------

    #[test]
    fn source_defaults_to_all() {
        assert_eq!(Source::default(), Source::All);
        assert!(Source::All.includes_local() && Source::All.includes_remote());
        assert!(Source::Custom.includes_local() && !Source::Custom.includes_remote());
        assert!(!Source::Api.includes_local() && Source::Api.includes_remote());
    }

    #[test]
    fn source_decodes_lowercase() {
        assert_eq!(serde_json::from_str::<Source>("\"api\"").unwrap(), Source::Api);
        assert_eq!(
            serde_json::from_str::<Source>("\"custom\"").unwrap(),
            Source::Custom
        );
        assert!(serde_json::from_str::<Source>("\"API\"").is_err());
    }

    // -- random sampling -----------------------------------------------------

    #[test]
    fn random_count_is_clamped() {
        assert_eq!(clamp_random_count(None), DEFAULT_RANDOM_COUNT as usize);
        assert_eq!(clamp_random_count(Some(0)), 1);
        assert_eq!(clamp_random_count(Some(-4)), 1);
        assert_eq!(clamp_random_count(Some(500)), MAX_RANDOM_COUNT as usize);
    }

    #[test]
    fn random_ids_are_distinct_and_in_range() {
        let ids = random_remote_ids(20);
        assert_eq!(ids.len(), 20);
        let mut unique = ids.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 20);
        assert!(ids.iter().all(|id| (1..=MAX_REMOTE_ID).contains(id)));
    }
}
