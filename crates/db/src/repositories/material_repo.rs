//! Repository for the `materials` table.
//!
//! Same version-binding rules as videos: writes only ever target the current
//! version's rows, clones happen at fork time.

use coursebase_core::types::{DbId, VersionNumber};
use sqlx::PgPool;

use crate::models::material::{CreateMaterial, Material, UpdateMaterial};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, course_id, course_version, title_primary, title_secondary, \
    blob_key, original_filename, mime_type, file_size_bytes, position, \
    deleted_at, created_at, updated_at";

/// Provides CRUD and soft-delete operations for course materials.
pub struct MaterialRepo;

impl MaterialRepo {
    // ── Standard CRUD ────────────────────────────────────────────────

    /// Insert a new material row bound to `course_version`.
    ///
    /// If `position` is `None`, appends after the version's last active row.
    pub async fn create(
        pool: &PgPool,
        course_version: VersionNumber,
        input: &CreateMaterial,
    ) -> Result<Material, sqlx::Error> {
        let query = format!(
            "INSERT INTO materials
                (course_id, course_version, title_primary, title_secondary,
                 blob_key, original_filename, mime_type, file_size_bytes, position)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
                 COALESCE($9, (SELECT COALESCE(MAX(position), -1) + 1
                     FROM materials
                     WHERE course_id = $1 AND course_version = $2 AND deleted_at IS NULL)))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Material>(&query)
            .bind(input.course_id)
            .bind(course_version)
            .bind(&input.title_primary)
            .bind(&input.title_secondary)
            .bind(&input.blob_key)
            .bind(&input.original_filename)
            .bind(&input.mime_type)
            .bind(input.file_size_bytes)
            .bind(input.position)
            .fetch_one(pool)
            .await
    }

    /// Find a material by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Material>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM materials WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Material>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the active materials of one course version, in position order.
    pub async fn list_for_version(
        pool: &PgPool,
        course_id: DbId,
        course_version: VersionNumber,
    ) -> Result<Vec<Material>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM materials
             WHERE course_id = $1 AND course_version = $2 AND deleted_at IS NULL
             ORDER BY position, id"
        );
        sqlx::query_as::<_, Material>(&query)
            .bind(course_id)
            .bind(course_version)
            .fetch_all(pool)
            .await
    }

    /// Update material metadata. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists (or is soft-deleted).
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMaterial,
    ) -> Result<Option<Material>, sqlx::Error> {
        let query = format!(
            "UPDATE materials SET
                title_primary = COALESCE($2, title_primary),
                title_secondary = COALESCE($3, title_secondary),
                position = COALESCE($4, position)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Material>(&query)
            .bind(id)
            .bind(&input.title_primary)
            .bind(&input.title_secondary)
            .bind(input.position)
            .fetch_optional(pool)
            .await
    }

    // ── Soft delete ──────────────────────────────────────────────────

    /// Soft-delete a material. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE materials SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted material while it still belongs to the course's
    /// current version. Returns `true` if a row was restored.
    pub async fn restore(
        pool: &PgPool,
        id: DbId,
        current_version: VersionNumber,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE materials SET deleted_at = NULL \
             WHERE id = $1 AND deleted_at IS NOT NULL AND course_version = $2",
        )
        .bind(id)
        .bind(current_version)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
