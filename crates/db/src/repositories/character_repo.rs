//! Repository for the `characters` table.
//!
//! Listing and search share one filtered query shape joined with the
//! creator's display name; the filter predicates are NULL-tolerant so a
//! single prepared statement covers every combination.

use sqlx::PgPool;

use portal_core::types::DbId;

use crate::models::character::{
    Character, CharacterFilter, CharacterWithCreator, CreateCharacter, UpdateCharacter,
};

/// Column list shared across single-table queries.
const COLUMNS: &str = "id, name, status, species, type, gender, origin_name, location_name, \
                       image, age_restriction, creator_id, created_at, updated_at";

/// Qualified column list for queries joining the creator.
const JOINED_COLUMNS: &str = "c.id, c.name, c.status, c.species, c.type, c.gender, \
                              c.origin_name, c.location_name, c.image, c.age_restriction, \
                              c.creator_id, c.created_at, c.updated_at, \
                              u.name AS creator_name";

/// Shared WHERE clause for [`CharacterRepo::search`] and
/// [`CharacterRepo::count`]. `$1` name pattern, `$2` creator, `$3`
/// all-ages flag.
const FILTER_PREDICATES: &str = "($1::text IS NULL OR c.name ILIKE $1)
       AND ($2::bigint IS NULL OR c.creator_id = $2)
       AND (NOT $3 OR c.age_restriction = 'all')";

/// Provides CRUD and filtered listing operations for custom characters.
pub struct CharacterRepo;

impl CharacterRepo {
    /// Insert a new character, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCharacter) -> Result<Character, sqlx::Error> {
        let query = format!(
            "INSERT INTO characters
                (name, status, species, type, gender, origin_name, location_name,
                 image, age_restriction, creator_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(&input.name)
            .bind(input.status.as_str())
            .bind(&input.species)
            .bind(&input.kind)
            .bind(input.gender.as_str())
            .bind(&input.origin_name)
            .bind(&input.location_name)
            .bind(&input.image)
            .bind(input.age_restriction.as_str())
            .bind(input.creator_id)
            .fetch_one(pool)
            .await
    }

    /// Find a character by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE id = $1");
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a character by ID with its creator's display name attached.
    pub async fn find_with_creator(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CharacterWithCreator>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM characters c
             JOIN users u ON u.id = c.creator_id
             WHERE c.id = $1"
        );
        sqlx::query_as::<_, CharacterWithCreator>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch the characters whose ids appear in `ids`, with creators.
    ///
    /// Row order is unspecified; callers that need a particular order
    /// (favorites resolution) re-order by id.
    pub async fn find_by_ids_with_creator(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<CharacterWithCreator>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM characters c
             JOIN users u ON u.id = c.creator_id
             WHERE c.id = ANY($1)"
        );
        sqlx::query_as::<_, CharacterWithCreator>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Filtered listing, newest first, with creators attached.
    ///
    /// `limit = None` returns all matches (search endpoint); listing passes
    /// a clamped page size.
    pub async fn search(
        pool: &PgPool,
        filter: &CharacterFilter,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<CharacterWithCreator>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM characters c
             JOIN users u ON u.id = c.creator_id
             WHERE {FILTER_PREDICATES}
             ORDER BY c.created_at DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, CharacterWithCreator>(&query)
            .bind(name_pattern(filter))
            .bind(filter.creator_id)
            .bind(filter.all_ages_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Number of rows matching `filter` (ignoring pagination).
    pub async fn count(pool: &PgPool, filter: &CharacterFilter) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*)
             FROM characters c
             WHERE {FILTER_PREDICATES}"
        );
        sqlx::query_scalar(&query)
            .bind(name_pattern(filter))
            .bind(filter.creator_id)
            .bind(filter.all_ages_only)
            .fetch_one(pool)
            .await
    }

    /// Update a character. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCharacter,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!(
            "UPDATE characters SET
                name = COALESCE($2, name),
                status = COALESCE($3, status),
                species = COALESCE($4, species),
                type = COALESCE($5, type),
                gender = COALESCE($6, gender),
                origin_name = COALESCE($7, origin_name),
                location_name = COALESCE($8, location_name),
                image = COALESCE($9, image),
                age_restriction = COALESCE($10, age_restriction),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.status.map(|s| s.as_str()))
            .bind(&input.species)
            .bind(&input.kind)
            .bind(input.gender.map(|g| g.as_str()))
            .bind(&input.origin_name)
            .bind(&input.location_name)
            .bind(&input.image)
            .bind(input.age_restriction.map(|a| a.as_str()))
            .fetch_optional(pool)
            .await
    }

    /// Delete a character. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM characters WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// ILIKE pattern for a name filter, with `%`/`_`/`\` in the user's term
/// escaped so they match literally.
fn name_pattern(filter: &CharacterFilter) -> Option<String> {
    filter.name.as_deref().map(|term| {
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{escaped}%")
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
