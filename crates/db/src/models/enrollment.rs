//! Enrollment entity model and DTOs.
//!
//! An enrollment row is the purchase record: its existence grants access to
//! the course, and `course_version` pins the version the student is entitled
//! to (captured at enrollment time, untouched by later forks).

use coursebase_core::types::{DbId, Timestamp, VersionNumber};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `enrollments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Enrollment {
    pub id: DbId,
    pub user_id: DbId,
    pub course_id: DbId,
    pub course_version: VersionNumber,
    pub created_at: Timestamp,
}

/// DTO for creating an enrollment.
#[derive(Debug, Clone)]
pub struct CreateEnrollment {
    pub user_id: DbId,
    pub course_id: DbId,
    pub course_version: VersionNumber,
}

/// Enrollment joined with course identity, for a student's "my courses" view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrollmentWithCourse {
    pub id: DbId,
    pub user_id: DbId,
    pub course_id: DbId,
    pub course_version: VersionNumber,
    pub created_at: Timestamp,
    pub course_slug: String,
    pub course_title_primary: String,
    pub course_title_secondary: Option<String>,
}

/// Enrollment joined with student identity, for the admin roster view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrollmentWithUser {
    pub id: DbId,
    pub user_id: DbId,
    pub course_id: DbId,
    pub course_version: VersionNumber,
    pub created_at: Timestamp,
    pub username: String,
    pub email: String,
}
