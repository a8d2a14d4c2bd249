//! Course version ledger entity.

use coursebase_core::types::{DbId, Timestamp, VersionNumber};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `course_versions` table.
///
/// Stats columns are recomputed whenever the version's manifest changes;
/// once a later version exists the row is never touched again.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseVersion {
    pub id: DbId,
    pub course_id: DbId,
    pub version_number: VersionNumber,
    pub change_log: Option<String>,
    pub created_by: Option<DbId>,
    pub video_count: i32,
    pub material_count: i32,
    pub total_duration_secs: f64,
    pub total_material_bytes: i64,
    pub created_at: Timestamp,
}
