//! Course entity model and DTOs.

use coursebase_core::types::{DbId, Timestamp, VersionNumber};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `courses` table.
///
/// `current_version` is the pointer flipped by a successful fork; content
/// rows reference `(id, course_version)` pairs, never this pointer.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub slug: String,
    pub title_primary: String,
    pub title_secondary: Option<String>,
    pub description_primary: Option<String>,
    pub description_secondary: Option<String>,
    pub thumbnail_key: Option<String>,
    pub current_version: VersionNumber,
    pub created_by: Option<DbId>,
    pub archived_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new course. Version 1 is allocated in the same
/// transaction as the course row.
#[derive(Debug, Clone)]
pub struct CreateCourse {
    pub slug: String,
    pub title_primary: String,
    pub title_secondary: Option<String>,
    pub description_primary: Option<String>,
    pub description_secondary: Option<String>,
    pub created_by: Option<DbId>,
}

/// DTO for updating course metadata. All fields optional; the slug is
/// immutable because stored blob keys embed it.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCourse {
    pub title_primary: Option<String>,
    pub title_secondary: Option<String>,
    pub description_primary: Option<String>,
    pub description_secondary: Option<String>,
}
