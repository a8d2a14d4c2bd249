//! Repository for the `course_versions` table, including the copy-on-write
//! fork that brings new versions into existence.

use coursebase_core::types::{DbId, VersionNumber};
use sqlx::PgPool;

use crate::models::course_version::CourseVersion;
use crate::models::material::CreateMaterial;
use crate::models::video::CreateVideo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, course_id, version_number, change_log, created_by, \
    video_count, material_count, total_duration_secs, total_material_bytes, created_at";

/// The single content change a fork applies on top of the cloned manifest.
#[derive(Debug, Clone)]
pub enum ForkChange {
    /// Insert a new video row bound to the forked version.
    AddVideo(CreateVideo),
    /// Leave the identified video out of the forked version's manifest.
    RemoveVideo(DbId),
    /// Insert a new material row bound to the forked version.
    AddMaterial(CreateMaterial),
    /// Leave the identified material out of the forked version's manifest.
    RemoveMaterial(DbId),
}

/// Outcome of a fork attempt.
#[derive(Debug)]
pub enum ForkResult {
    /// The new version row; the course's pointer now targets it.
    Forked(CourseVersion),
    /// The course's current version no longer matches what the caller
    /// observed. The transaction rolled back; nothing was persisted.
    Conflict,
}

/// DTO describing a fork to perform.
#[derive(Debug, Clone)]
pub struct ForkCourseVersion {
    pub course_id: DbId,
    /// Version the caller observed as current. The pointer flip is a
    /// compare-and-set against this value.
    pub expected_version: VersionNumber,
    pub change_log: Option<String>,
    pub created_by: Option<DbId>,
}

/// Provides ledger queries and the fork operation for course versions.
pub struct CourseVersionRepo;

impl CourseVersionRepo {
    // ── Ledger queries ───────────────────────────────────────────────

    /// Find one version of a course by its number.
    pub async fn find_by_number(
        pool: &PgPool,
        course_id: DbId,
        version_number: VersionNumber,
    ) -> Result<Option<CourseVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM course_versions
             WHERE course_id = $1 AND version_number = $2"
        );
        sqlx::query_as::<_, CourseVersion>(&query)
            .bind(course_id)
            .bind(version_number)
            .fetch_optional(pool)
            .await
    }

    /// List all versions of a course, newest first.
    pub async fn list_by_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<CourseVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM course_versions
             WHERE course_id = $1
             ORDER BY version_number DESC"
        );
        sqlx::query_as::<_, CourseVersion>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    /// Recompute the stats columns of a version from its active content rows.
    ///
    /// Only ever called for the version currently being mutated; superseded
    /// versions are never touched.
    pub async fn refresh_stats(
        pool: &PgPool,
        course_id: DbId,
        version_number: VersionNumber,
    ) -> Result<Option<CourseVersion>, sqlx::Error> {
        let query = format!("{} RETURNING {COLUMNS}", stats_update_sql());
        sqlx::query_as::<_, CourseVersion>(&query)
            .bind(course_id)
            .bind(version_number)
            .fetch_optional(pool)
            .await
    }

    // ── Copy-on-write fork ───────────────────────────────────────────

    /// Fork a course's current version into a new one, applying `change`.
    ///
    /// Runs in a single transaction holding `pg_advisory_xact_lock(course_id)`:
    ///
    /// 1. allocate `max(version_number) + 1`, recomputed fresh each attempt
    /// 2. insert the version row
    /// 3. clone every still-active content row of `expected_version` into the
    ///    new version (new ids, same blob keys), leaving out a removed row
    /// 4. insert the added row, if any
    /// 5. recompute the new version's stats
    /// 6. flip `courses.current_version` via compare-and-set; zero rows
    ///    affected means a concurrent writer won and the whole transaction
    ///    rolls back ([`ForkResult::Conflict`])
    ///
    /// Rows of `expected_version` are read, never written.
    pub async fn fork(
        pool: &PgPool,
        input: &ForkCourseVersion,
        change: &ForkChange,
    ) -> Result<ForkResult, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(input.course_id)
            .execute(&mut *tx)
            .await?;

        // Re-read the pointer under the lock. A fork that committed between
        // the caller's read and here shows up as a mismatch.
        let current: Option<(VersionNumber,)> =
            sqlx::query_as("SELECT current_version FROM courses WHERE id = $1")
                .bind(input.course_id)
                .fetch_optional(&mut *tx)
                .await?;
        match current {
            Some((v,)) if v == input.expected_version => {}
            _ => return Ok(ForkResult::Conflict),
        }

        let next: (VersionNumber,) = sqlx::query_as(
            "SELECT COALESCE(MAX(version_number), 0) + 1 \
             FROM course_versions WHERE course_id = $1",
        )
        .bind(input.course_id)
        .fetch_one(&mut *tx)
        .await?;
        let new_version = next.0;

        let query = format!(
            "INSERT INTO course_versions (course_id, version_number, change_log, created_by)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CourseVersion>(&query)
            .bind(input.course_id)
            .bind(new_version)
            .bind(&input.change_log)
            .bind(input.created_by)
            .fetch_one(&mut *tx)
            .await?;

        let excluded_video = match change {
            ForkChange::RemoveVideo(id) => Some(*id),
            _ => None,
        };
        sqlx::query(
            "INSERT INTO videos
                (course_id, course_version, title_primary, title_secondary,
                 description_primary, description_secondary, blob_key,
                 original_filename, duration_secs, is_free_preview, position)
             SELECT course_id, $3, title_primary, title_secondary,
                 description_primary, description_secondary, blob_key,
                 original_filename, duration_secs, is_free_preview, position
             FROM videos
             WHERE course_id = $1 AND course_version = $2 AND deleted_at IS NULL
               AND ($4::BIGINT IS NULL OR id <> $4)",
        )
        .bind(input.course_id)
        .bind(input.expected_version)
        .bind(new_version)
        .bind(excluded_video)
        .execute(&mut *tx)
        .await?;

        let excluded_material = match change {
            ForkChange::RemoveMaterial(id) => Some(*id),
            _ => None,
        };
        sqlx::query(
            "INSERT INTO materials
                (course_id, course_version, title_primary, title_secondary,
                 blob_key, original_filename, mime_type, file_size_bytes, position)
             SELECT course_id, $3, title_primary, title_secondary,
                 blob_key, original_filename, mime_type, file_size_bytes, position
             FROM materials
             WHERE course_id = $1 AND course_version = $2 AND deleted_at IS NULL
               AND ($4::BIGINT IS NULL OR id <> $4)",
        )
        .bind(input.course_id)
        .bind(input.expected_version)
        .bind(new_version)
        .bind(excluded_material)
        .execute(&mut *tx)
        .await?;

        match change {
            ForkChange::AddVideo(video) => {
                sqlx::query(
                    "INSERT INTO videos
                        (course_id, course_version, title_primary, title_secondary,
                         description_primary, description_secondary, blob_key,
                         original_filename, duration_secs, is_free_preview, position)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, false),
                         COALESCE($11, (SELECT COALESCE(MAX(position), -1) + 1
                             FROM videos
                             WHERE course_id = $1 AND course_version = $2 AND deleted_at IS NULL)))",
                )
                .bind(input.course_id)
                .bind(new_version)
                .bind(&video.title_primary)
                .bind(&video.title_secondary)
                .bind(&video.description_primary)
                .bind(&video.description_secondary)
                .bind(&video.blob_key)
                .bind(&video.original_filename)
                .bind(video.duration_secs)
                .bind(video.is_free_preview)
                .bind(video.position)
                .execute(&mut *tx)
                .await?;
            }
            ForkChange::AddMaterial(material) => {
                sqlx::query(
                    "INSERT INTO materials
                        (course_id, course_version, title_primary, title_secondary,
                         blob_key, original_filename, mime_type, file_size_bytes, position)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
                         COALESCE($9, (SELECT COALESCE(MAX(position), -1) + 1
                             FROM materials
                             WHERE course_id = $1 AND course_version = $2 AND deleted_at IS NULL)))",
                )
                .bind(input.course_id)
                .bind(new_version)
                .bind(&material.title_primary)
                .bind(&material.title_secondary)
                .bind(&material.blob_key)
                .bind(&material.original_filename)
                .bind(&material.mime_type)
                .bind(material.file_size_bytes)
                .bind(material.position)
                .execute(&mut *tx)
                .await?;
            }
            ForkChange::RemoveVideo(_) | ForkChange::RemoveMaterial(_) => {}
        }

        let query = format!("{} RETURNING {COLUMNS}", stats_update_sql());
        let version = sqlx::query_as::<_, CourseVersion>(&query)
            .bind(input.course_id)
            .bind(new_version)
            .fetch_one(&mut *tx)
            .await?;

        let flipped = sqlx::query(
            "UPDATE courses SET current_version = $3 \
             WHERE id = $1 AND current_version = $2",
        )
        .bind(input.course_id)
        .bind(input.expected_version)
        .bind(new_version)
        .execute(&mut *tx)
        .await?;
        if flipped.rows_affected() == 0 {
            return Ok(ForkResult::Conflict);
        }

        tx.commit().await?;
        tracing::debug!(
            course_id = input.course_id,
            from = input.expected_version,
            to = new_version,
            "Forked course version"
        );
        Ok(ForkResult::Forked(version))
    }
}

/// UPDATE recomputing a version's stats from its active content rows.
/// Binds: `$1` course id, `$2` version number.
fn stats_update_sql() -> &'static str {
    "UPDATE course_versions SET
        video_count = (SELECT COUNT(*) FROM videos
            WHERE course_id = $1 AND course_version = $2 AND deleted_at IS NULL),
        material_count = (SELECT COUNT(*) FROM materials
            WHERE course_id = $1 AND course_version = $2 AND deleted_at IS NULL),
        total_duration_secs = (SELECT COALESCE(SUM(duration_secs), 0) FROM videos
            WHERE course_id = $1 AND course_version = $2 AND deleted_at IS NULL),
        total_material_bytes = (SELECT COALESCE(SUM(file_size_bytes), 0) FROM materials
            WHERE course_id = $1 AND course_version = $2 AND deleted_at IS NULL)
     WHERE course_id = $1 AND version_number = $2"
}
