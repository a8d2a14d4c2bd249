//! Course material entity model and DTOs.

use coursebase_core::types::{DbId, Timestamp, VersionNumber};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `materials` table, permanently bound to its
/// `(course_id, course_version)`.
///
/// Contains the blob key -- NEVER serialize this to API responses directly.
#[derive(Debug, Clone, FromRow)]
pub struct Material {
    pub id: DbId,
    pub course_id: DbId,
    pub course_version: VersionNumber,
    pub title_primary: String,
    pub title_secondary: Option<String>,
    pub blob_key: String,
    pub original_filename: String,
    pub mime_type: String,
    pub file_size_bytes: i64,
    pub position: i32,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new material row.
#[derive(Debug, Clone)]
pub struct CreateMaterial {
    pub course_id: DbId,
    pub title_primary: String,
    pub title_secondary: Option<String>,
    pub blob_key: String,
    pub original_filename: String,
    pub mime_type: String,
    pub file_size_bytes: i64,
    pub position: Option<i32>,
}

/// DTO for metadata-only patches. Never triggers a fork.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateMaterial {
    pub title_primary: Option<String>,
    pub title_secondary: Option<String>,
    pub position: Option<i32>,
}
