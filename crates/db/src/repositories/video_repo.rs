//! Repository for the `videos` table.
//!
//! Inserts and updates here only ever target rows of a course's current
//! version; older versions are written once, at fork time, and never again.

use coursebase_core::types::{DbId, VersionNumber};
use sqlx::PgPool;

use crate::models::video::{CreateVideo, UpdateVideo, Video};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, course_id, course_version, title_primary, title_secondary, \
    description_primary, description_secondary, blob_key, original_filename, \
    duration_secs, is_free_preview, position, deleted_at, created_at, updated_at";

/// Provides CRUD and soft-delete operations for videos.
pub struct VideoRepo;

impl VideoRepo {
    // ── Standard CRUD ────────────────────────────────────────────────

    /// Insert a new video row bound to `course_version`.
    ///
    /// If `position` is `None`, appends after the version's last active row.
    /// If `is_free_preview` is `None`, defaults to `false`.
    pub async fn create(
        pool: &PgPool,
        course_version: VersionNumber,
        input: &CreateVideo,
    ) -> Result<Video, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos
                (course_id, course_version, title_primary, title_secondary,
                 description_primary, description_secondary, blob_key,
                 original_filename, duration_secs, is_free_preview, position)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, false),
                 COALESCE($11, (SELECT COALESCE(MAX(position), -1) + 1
                     FROM videos
                     WHERE course_id = $1 AND course_version = $2 AND deleted_at IS NULL)))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(input.course_id)
            .bind(course_version)
            .bind(&input.title_primary)
            .bind(&input.title_secondary)
            .bind(&input.description_primary)
            .bind(&input.description_secondary)
            .bind(&input.blob_key)
            .bind(&input.original_filename)
            .bind(input.duration_secs)
            .bind(input.is_free_preview)
            .bind(input.position)
            .fetch_one(pool)
            .await
    }

    /// Find a video by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the active videos of one course version, in position order.
    pub async fn list_for_version(
        pool: &PgPool,
        course_id: DbId,
        course_version: VersionNumber,
    ) -> Result<Vec<Video>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM videos
             WHERE course_id = $1 AND course_version = $2 AND deleted_at IS NULL
             ORDER BY position, id"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(course_id)
            .bind(course_version)
            .fetch_all(pool)
            .await
    }

    /// Update video metadata. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists (or is soft-deleted).
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateVideo,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET
                title_primary = COALESCE($2, title_primary),
                title_secondary = COALESCE($3, title_secondary),
                description_primary = COALESCE($4, description_primary),
                description_secondary = COALESCE($5, description_secondary),
                duration_secs = COALESCE($6, duration_secs),
                is_free_preview = COALESCE($7, is_free_preview),
                position = COALESCE($8, position)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(&input.title_primary)
            .bind(&input.title_secondary)
            .bind(&input.description_primary)
            .bind(&input.description_secondary)
            .bind(input.duration_secs)
            .bind(input.is_free_preview)
            .bind(input.position)
            .fetch_optional(pool)
            .await
    }

    // ── Soft delete ──────────────────────────────────────────────────

    /// Soft-delete a video. The row and its blob survive; only visibility
    /// changes. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE videos SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted video, but only while it still belongs to the
    /// course's current version; rows on superseded versions stay as they
    /// were. Returns `true` if a row was restored.
    pub async fn restore(
        pool: &PgPool,
        id: DbId,
        current_version: VersionNumber,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE videos SET deleted_at = NULL \
             WHERE id = $1 AND deleted_at IS NOT NULL AND course_version = $2",
        )
        .bind(id)
        .bind(current_version)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
