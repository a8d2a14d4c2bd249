//! Video entity model and DTOs.

use coursebase_core::types::{DbId, Timestamp, VersionNumber};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `videos` table, permanently bound to its
/// `(course_id, course_version)`.
///
/// Contains the blob key -- NEVER serialize this to API responses directly.
/// The api layer maps rows into access-annotated DTOs that omit the key.
#[derive(Debug, Clone, FromRow)]
pub struct Video {
    pub id: DbId,
    pub course_id: DbId,
    pub course_version: VersionNumber,
    pub title_primary: String,
    pub title_secondary: Option<String>,
    pub description_primary: Option<String>,
    pub description_secondary: Option<String>,
    pub blob_key: String,
    pub original_filename: String,
    pub duration_secs: Option<f64>,
    pub is_free_preview: bool,
    pub position: i32,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new video row. The target version number is supplied
/// by the caller (current version in place, or the fork's new version).
#[derive(Debug, Clone)]
pub struct CreateVideo {
    pub course_id: DbId,
    pub title_primary: String,
    pub title_secondary: Option<String>,
    pub description_primary: Option<String>,
    pub description_secondary: Option<String>,
    pub blob_key: String,
    pub original_filename: String,
    pub duration_secs: Option<f64>,
    pub is_free_preview: Option<bool>,
    pub position: Option<i32>,
}

/// DTO for metadata-only patches. Never triggers a fork.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateVideo {
    pub title_primary: Option<String>,
    pub title_secondary: Option<String>,
    pub description_primary: Option<String>,
    pub description_secondary: Option<String>,
    pub duration_secs: Option<f64>,
    pub is_free_preview: Option<bool>,
    pub position: Option<i32>,
}
