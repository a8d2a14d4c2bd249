//! Repository for the `enrollments` table.

use coursebase_core::types::DbId;
use sqlx::PgPool;

use crate::models::enrollment::{
    CreateEnrollment, Enrollment, EnrollmentWithCourse, EnrollmentWithUser,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, course_id, course_version, created_at";

/// Provides purchase-record operations for enrollments.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Insert a new enrollment, pinning the course version the student is
    /// entitled to. A duplicate `(user_id, course_id)` surfaces as a unique
    /// violation on `uq_enrollments_user_id_course_id`.
    pub async fn create(pool: &PgPool, input: &CreateEnrollment) -> Result<Enrollment, sqlx::Error> {
        let query = format!(
            "INSERT INTO enrollments (user_id, course_id, course_version)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(input.user_id)
            .bind(input.course_id)
            .bind(input.course_version)
            .fetch_one(pool)
            .await
    }

    /// Find a user's enrollment in a course, if any. This is the purchase
    /// check: a row exists exactly when the user has bought the course.
    pub async fn find_by_user_and_course(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM enrollments WHERE user_id = $1 AND course_id = $2"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a course has any enrollments at all. This is the branch
    /// trigger: content add/remove forks a new version exactly when `true`.
    pub async fn exists_for_course(pool: &PgPool, course_id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM enrollments WHERE course_id = $1)")
                .bind(course_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// List a course's enrollments with student identity, newest first.
    pub async fn list_by_course_with_user(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<EnrollmentWithUser>, sqlx::Error> {
        sqlx::query_as::<_, EnrollmentWithUser>(
            "SELECT e.id, e.user_id, e.course_id, e.course_version, e.created_at,
                    u.username, u.email
             FROM enrollments e
             JOIN users u ON u.id = e.user_id
             WHERE e.course_id = $1
             ORDER BY e.created_at DESC",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }

    /// List a user's enrollments with course identity, newest first.
    pub async fn list_by_user_with_course(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<EnrollmentWithCourse>, sqlx::Error> {
        sqlx::query_as::<_, EnrollmentWithCourse>(
            "SELECT e.id, e.user_id, e.course_id, e.course_version, e.created_at,
                    c.slug AS course_slug,
                    c.title_primary AS course_title_primary,
                    c.title_secondary AS course_title_secondary
             FROM enrollments e
             JOIN courses c ON c.id = e.course_id
             WHERE e.user_id = $1
             ORDER BY e.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
