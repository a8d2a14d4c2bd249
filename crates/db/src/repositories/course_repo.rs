//! Repository for the `courses` table.

use coursebase_core::types::DbId;
use coursebase_core::versioning::INITIAL_VERSION;
use sqlx::PgPool;

use crate::models::course::{Course, CreateCourse, UpdateCourse};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, slug, title_primary, title_secondary, \
    description_primary, description_secondary, thumbnail_key, \
    current_version, created_by, archived_at, created_at, updated_at";

/// Provides CRUD and archival operations for courses.
pub struct CourseRepo;

impl CourseRepo {
    // ── Standard CRUD ────────────────────────────────────────────────

    /// Insert a new course together with its version 1 ledger row, in one
    /// transaction.
    pub async fn create(pool: &PgPool, input: &CreateCourse) -> Result<Course, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO courses
                (slug, title_primary, title_secondary, description_primary,
                 description_secondary, current_version, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let course = sqlx::query_as::<_, Course>(&query)
            .bind(&input.slug)
            .bind(&input.title_primary)
            .bind(&input.title_secondary)
            .bind(&input.description_primary)
            .bind(&input.description_secondary)
            .bind(INITIAL_VERSION)
            .bind(input.created_by)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO course_versions (course_id, version_number, created_by)
             VALUES ($1, $2, $3)",
        )
        .bind(course.id)
        .bind(INITIAL_VERSION)
        .bind(input.created_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(course)
    }

    /// Find a course by its internal ID. Archived courses are returned so
    /// enrolled students keep access; listings filter them out instead.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a course by slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE slug = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List unarchived courses, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM courses
             WHERE archived_at IS NULL
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Course>(&query).fetch_all(pool).await
    }

    /// Update course metadata. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourse,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses SET
                title_primary = COALESCE($2, title_primary),
                title_secondary = COALESCE($3, title_secondary),
                description_primary = COALESCE($4, description_primary),
                description_secondary = COALESCE($5, description_secondary)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(&input.title_primary)
            .bind(&input.title_secondary)
            .bind(&input.description_primary)
            .bind(&input.description_secondary)
            .fetch_optional(pool)
            .await
    }

    /// Point the course at a new thumbnail blob key. Thumbnails are cosmetic
    /// and exempt from versioning; the previous key is simply replaced.
    pub async fn set_thumbnail(
        pool: &PgPool,
        id: DbId,
        thumbnail_key: &str,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses SET thumbnail_key = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(thumbnail_key)
            .fetch_optional(pool)
            .await
    }

    // ── Archival ─────────────────────────────────────────────────────

    /// Archive a course (hide from listings). Returns `true` if a row was
    /// newly archived.
    pub async fn archive(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE courses SET archived_at = NOW() WHERE id = $1 AND archived_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Reverse an archive. Returns `true` if a row was restored to listings.
    pub async fn unarchive(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE courses SET archived_at = NULL WHERE id = $1 AND archived_at IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
