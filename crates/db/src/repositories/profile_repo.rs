//! Repository for the `profiles` table.
//!
//! Favorites are a TEXT[] column mutated with `array_append` /
//! `array_remove` so each write is a single statement. Duplicate and
//! membership checks live in the service layer; the last write wins at the
//! row level.

use sqlx::PgPool;

use portal_core::types::DbId;

use crate::models::profile::{CreateProfile, Profile, UpdateProfile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, name, avatar, age, kind, favorites, created_at, updated_at";

/// Provides CRUD and favorites operations for profiles.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Insert a new profile, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProfile) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (user_id, name, avatar, age, kind)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(input.user_id)
            .bind(&input.name)
            .bind(&input.avatar)
            .bind(input.age)
            .bind(input.kind.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a profile by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's profiles, oldest first (creation order).
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Number of profiles a user currently has.
    pub async fn count_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Update a profile. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE profiles SET
                name = COALESCE($2, name),
                avatar = COALESCE($3, avatar),
                age = COALESCE($4, age),
                kind = COALESCE($5, kind),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.avatar)
            .bind(input.age)
            .bind(input.kind.map(|k| k.as_str()))
            .fetch_optional(pool)
            .await
    }

    /// Delete a profile. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append a character reference to the favorites list.
    ///
    /// Returns `None` if no row with the given `id` exists. The caller is
    /// responsible for rejecting duplicates first.
    pub async fn add_favorite(
        pool: &PgPool,
        id: DbId,
        reference: &str,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE profiles SET
                favorites = array_append(favorites, $2),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(reference)
            .fetch_optional(pool)
            .await
    }

    /// Remove every occurrence of a character reference from the favorites
    /// list.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn remove_favorite(
        pool: &PgPool,
        id: DbId,
        reference: &str,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE profiles SET
                favorites = array_remove(favorites, $2),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(reference)
            .fetch_optional(pool)
            .await
    }
}
