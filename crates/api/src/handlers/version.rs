//! Handlers for the admin version-history views under
//! `/courses/{id}/versions`.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use coursebase_core::error::CoreError;
use coursebase_core::types::{DbId, VersionNumber};
use coursebase_core::versioning::Manifest;
use coursebase_db::models::course_version::CourseVersion;
use coursebase_db::repositories::{CourseVersionRepo, MaterialRepo, VideoRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::course::ensure_course_exists;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// One version together with the content ids it serves.
#[derive(Debug, Serialize)]
pub struct VersionDetail {
    #[serde(flatten)]
    pub version: CourseVersion,
    pub manifest: Manifest,
}

// ---------------------------------------------------------------------------
// GET /courses/{course_id}/versions
// ---------------------------------------------------------------------------

/// List every version of a course, newest first, with stats and change logs.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(course_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_course_exists(&state.pool, course_id).await?;
    let versions = CourseVersionRepo::list_by_course(&state.pool, course_id).await?;
    Ok(Json(DataResponse { data: versions }))
}

// ---------------------------------------------------------------------------
// GET /courses/{course_id}/versions/{version_number}
// ---------------------------------------------------------------------------

/// Get one version and its manifest (the active content item ids, in
/// position order).
pub async fn get(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path((course_id, version_number)): Path<(DbId, VersionNumber)>,
) -> AppResult<impl IntoResponse> {
    ensure_course_exists(&state.pool, course_id).await?;

    let version = CourseVersionRepo::find_by_number(&state.pool, course_id, version_number)
        .await?
        .ok_or(AppError::Core(CoreError::VersionNotFound {
            course_id,
            version: version_number,
        }))?;

    let videos = VideoRepo::list_for_version(&state.pool, course_id, version_number).await?;
    let materials = MaterialRepo::list_for_version(&state.pool, course_id, version_number).await?;
    let manifest = Manifest {
        video_ids: videos.into_iter().map(|v| v.id).collect(),
        material_ids: materials.into_iter().map(|m| m.id).collect(),
    };

    Ok(Json(DataResponse {
        data: VersionDetail { version, manifest },
    }))
}
