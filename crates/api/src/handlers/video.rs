//! Handlers for the `/courses/{course_id}/videos` resource.
//!
//! Uploads and removals go through the branch decision: they mutate the
//! current version in place until the course has enrollments, then fork a
//! new version instead. Metadata edits always apply in place.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use coursebase_core::blobkey::video_key;
use coursebase_core::error::CoreError;
use coursebase_core::localized::{LocalizedInput, LocalizedText};
use coursebase_core::types::{DbId, VersionNumber};
use coursebase_core::uploads::validate_video_upload;
use coursebase_core::versioning::{
    decide_branch, ensure_current_version, validate_change_log, BranchDecision, MutationKind,
};
use coursebase_db::models::course::Course;
use coursebase_db::models::course_version::CourseVersion;
use coursebase_db::models::video::{CreateVideo, UpdateVideo, Video};
use coursebase_db::repositories::course_version_repo::{
    ForkChange, ForkCourseVersion, ForkResult,
};
use coursebase_db::repositories::{CourseVersionRepo, EnrollmentRepo, VideoRepo};
use serde::{Deserialize, Serialize};

use crate::access::{annotate_video, annotate_videos, VideoView, Viewer};
use crate::error::{AppError, AppResult};
use crate::handlers::course::ensure_course_exists;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query string for content listings: admins may pin a historical version.
#[derive(Debug, Deserialize)]
pub struct VersionQuery {
    pub version: Option<VersionNumber>,
}

/// Request body for `PATCH .../videos/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateVideoRequest {
    pub title: Option<LocalizedInput>,
    pub description: Option<LocalizedInput>,
    pub duration_secs: Option<f64>,
    pub is_free_preview: Option<bool>,
    pub position: Option<i32>,
}

/// Response for mutations that may have produced a new version: the
/// affected video plus the version snapshot it now belongs to.
#[derive(Debug, Serialize)]
pub struct VideoMutationResponse {
    pub video: VideoView,
    pub version: CourseVersion,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Default change log line for membership mutations; clients may override
/// it with the `change_log` form field.
pub(crate) fn default_change_log(action: &str, kind: &str, title: &str) -> String {
    const TITLE_CLIP: usize = 80;
    let clipped: String = title.chars().take(TITLE_CLIP).collect();
    let ellipsis = if title.chars().count() > TITLE_CLIP {
        "..."
    } else {
        ""
    };
    format!("{action} {kind}: {clipped}{ellipsis}")
}

/// Empty-after-trim strings collapse to `None` for nullable columns.
fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

/// The version snapshot after an in-place mutation. A missing row here means
/// the ledger lost the current version, which is corrupt state.
pub(crate) async fn refreshed_current(
    pool: &sqlx::PgPool,
    course: &Course,
) -> AppResult<CourseVersion> {
    CourseVersionRepo::refresh_stats(pool, course.id, course.current_version)
        .await?
        .ok_or_else(|| {
            AppError::InternalError(format!(
                "No ledger row for current version {} of course {}",
                course.current_version, course.id
            ))
        })
}

/// Build the viewer for responses to the admin who performed a mutation.
fn admin_viewer(version: VersionNumber) -> Viewer {
    Viewer {
        is_admin: true,
        purchased: false,
        version,
    }
}

/// Find a video, checking it belongs to the course in the path.
async fn ensure_video_in_course(
    pool: &sqlx::PgPool,
    course_id: DbId,
    id: DbId,
) -> AppResult<Video> {
    let video = VideoRepo::find_by_id(pool, id)
        .await?
        .filter(|v| v.course_id == course_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Video",
            id,
        }))?;
    Ok(video)
}

// ---------------------------------------------------------------------------
// POST /courses/{course_id}/videos
// ---------------------------------------------------------------------------

/// Upload a video.
///
/// Multipart form fields:
/// - `file` (required): the video payload
/// - `title` (required): plain text or a bilingual JSON object
/// - `description`, `duration_secs`, `is_free_preview`, `position`,
///   `change_log` (optional)
///
/// The blob is stored before any row is written, so a failed upload never
/// leaves a row pointing at a missing blob. Without enrollments the video
/// joins the current version in place; with enrollments a new version is
/// forked and the pointer flips to it.
pub async fn upload(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(course_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let course = ensure_course_exists(&state.pool, course_id).await?;

    let mut file_data: Option<(String, String, Vec<u8>)> = None;
    let mut title: Option<LocalizedText> = None;
    let mut description: Option<LocalizedText> = None;
    let mut duration_secs: Option<f64> = None;
    let mut is_free_preview: Option<bool> = None;
    let mut position: Option<i32> = None;
    let mut change_log: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload.mp4").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file_data = Some((filename, content_type, data.to_vec()));
            }
            "title" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                title = Some(LocalizedText::parse(&text));
            }
            "description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                description = Some(LocalizedText::parse(&text));
            }
            "duration_secs" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                duration_secs = Some(text.parse().map_err(|_| {
                    AppError::BadRequest(format!("Invalid duration_secs: '{text}'"))
                })?);
            }
            "is_free_preview" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                is_free_preview = Some(text.parse().map_err(|_| {
                    AppError::BadRequest(format!("Invalid is_free_preview: '{text}'"))
                })?);
            }
            "position" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                position = Some(text.parse().map_err(|_| {
                    AppError::BadRequest(format!("Invalid position: '{text}'"))
                })?);
            }
            "change_log" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                change_log = Some(text);
            }
            _ => {} // ignore unknown fields
        }
    }

    let (filename, content_type, data) =
        file_data.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    let title =
        title.ok_or_else(|| AppError::BadRequest("Missing required 'title' field".into()))?;

    title.require_primary("title")?;
    validate_video_upload(&content_type, &filename)?;
    if let Some(ref log) = change_log {
        validate_change_log(log)?;
    }

    let has_enrollments = EnrollmentRepo::exists_for_course(&state.pool, course_id).await?;
    let decision = decide_branch(MutationKind::Add, has_enrollments);
    let target_version = match decision {
        BranchDecision::InPlace => course.current_version,
        BranchDecision::Fork => course.current_version + 1,
    };

    let key = video_key(&course.slug, target_version, Utc::now().timestamp(), &filename);
    state.blob.put(&key, data, &content_type).await?;

    let input = CreateVideo {
        course_id,
        title_primary: title.primary.clone(),
        title_secondary: non_empty(title.secondary),
        description_primary: description.as_ref().and_then(|d| non_empty(d.primary.clone())),
        description_secondary: description
            .as_ref()
            .and_then(|d| non_empty(d.secondary.clone())),
        blob_key: key.clone(),
        original_filename: filename,
        duration_secs,
        is_free_preview,
        position,
    };

    let (video, version) = match decision {
        BranchDecision::InPlace => {
            let video = VideoRepo::create(&state.pool, course.current_version, &input).await?;
            let version = refreshed_current(&state.pool, &course).await?;
            (video, version)
        }
        BranchDecision::Fork => {
            let log = change_log
                .unwrap_or_else(|| default_change_log("Added", "video", &title.primary));
            let fork = ForkCourseVersion {
                course_id,
                expected_version: course.current_version,
                change_log: Some(log),
                created_by: Some(admin.user_id),
            };
            let version =
                match CourseVersionRepo::fork(&state.pool, &fork, &ForkChange::AddVideo(input))
                    .await?
                {
                    ForkResult::Forked(version) => version,
                    ForkResult::Conflict => {
                        // The stored blob stays behind for offline cleanup.
                        return Err(AppError::Core(CoreError::Conflict(
                            "Course was modified concurrently. Retry the upload.".into(),
                        )));
                    }
                };
            let video = VideoRepo::list_for_version(&state.pool, course_id, version.version_number)
                .await?
                .into_iter()
                .find(|v| v.blob_key == key)
                .ok_or_else(|| {
                    AppError::InternalError(format!(
                        "Forked version {} of course {} is missing the uploaded video",
                        version.version_number, course_id
                    ))
                })?;
            (video, version)
        }
    };

    tracing::info!(
        course_id,
        video_id = video.id,
        version = version.version_number,
        forked = matches!(decision, BranchDecision::Fork),
        user_id = admin.user_id,
        "Video uploaded"
    );

    let viewer = admin_viewer(version.version_number);
    let view = annotate_video(
        state.blob.as_ref(),
        state.config.blob.signed_url_ttl(),
        video,
        &viewer,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: VideoMutationResponse {
                video: view,
                version,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /courses/{course_id}/videos
// ---------------------------------------------------------------------------

/// List the videos of the viewer's entitled version, annotated with access
/// and signed URLs where granted.
pub async fn list(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(course_id): Path<DbId>,
    Query(query): Query<VersionQuery>,
) -> AppResult<impl IntoResponse> {
    let course = ensure_course_exists(&state.pool, course_id).await?;
    let viewer = Viewer::resolve(&state.pool, user.as_ref(), &course, query.version).await?;

    let videos = VideoRepo::list_for_version(&state.pool, course_id, viewer.version).await?;
    let views = annotate_videos(
        state.blob.as_ref(),
        state.config.blob.signed_url_ttl(),
        videos,
        &viewer,
    )
    .await?;

    Ok(Json(DataResponse { data: views }))
}

// ---------------------------------------------------------------------------
// GET /courses/{course_id}/videos/{id}
// ---------------------------------------------------------------------------

/// Get one video. Non-admin viewers only see rows of their entitled
/// version; anything else is a 404, not a 403.
pub async fn get_by_id(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path((course_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let course = ensure_course_exists(&state.pool, course_id).await?;
    let viewer = Viewer::resolve(&state.pool, user.as_ref(), &course, None).await?;

    let video = ensure_video_in_course(&state.pool, course_id, id).await?;
    if !viewer.is_admin && video.course_version != viewer.version {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Video",
            id,
        }));
    }

    let view = annotate_video(
        state.blob.as_ref(),
        state.config.blob.signed_url_ttl(),
        video,
        &viewer,
    )
    .await?;

    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// PATCH /courses/{course_id}/videos/{id}
// ---------------------------------------------------------------------------

/// Edit video metadata in place. Metadata edits never fork, so the row keeps
/// its version and the course pointer does not move. Rows of superseded
/// versions are frozen and cannot be edited at all.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path((course_id, id)): Path<(DbId, DbId)>,
    Json(body): Json<UpdateVideoRequest>,
) -> AppResult<impl IntoResponse> {
    let course = ensure_course_exists(&state.pool, course_id).await?;
    let video = ensure_video_in_course(&state.pool, course_id, id).await?;
    ensure_current_version(video.course_version, course.current_version)?;

    let title = body.title.map(LocalizedText::from);
    if let Some(ref t) = title {
        t.require_primary("title")?;
    }
    let description = body.description.map(LocalizedText::from);

    let input = UpdateVideo {
        title_primary: title.as_ref().map(|t| t.primary.clone()),
        title_secondary: title.as_ref().and_then(|t| non_empty(t.secondary.clone())),
        description_primary: description.as_ref().and_then(|d| non_empty(d.primary.clone())),
        description_secondary: description
            .as_ref()
            .and_then(|d| non_empty(d.secondary.clone())),
        duration_secs: body.duration_secs,
        is_free_preview: body.is_free_preview,
        position: body.position,
    };

    let video = VideoRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Video",
            id,
        }))?;

    // Duration feeds the version's aggregate stats.
    if body.duration_secs.is_some() {
        CourseVersionRepo::refresh_stats(&state.pool, course_id, video.course_version).await?;
    }

    tracing::info!(course_id, video_id = id, "Video metadata updated");

    let viewer = admin_viewer(video.course_version);
    let view = annotate_video(
        state.blob.as_ref(),
        state.config.blob.signed_url_ttl(),
        video,
        &viewer,
    )
    .await?;

    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// DELETE /courses/{course_id}/videos/{id}
// ---------------------------------------------------------------------------

/// Remove a video from the course's current version.
///
/// Without enrollments the row is soft-deleted in place; with enrollments
/// the course forks to a version that excludes it. The stored blob is never
/// deleted either way: historical versions keep referencing it.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((course_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let course = ensure_course_exists(&state.pool, course_id).await?;
    let video = ensure_video_in_course(&state.pool, course_id, id).await?;
    ensure_current_version(video.course_version, course.current_version)?;

    let has_enrollments = EnrollmentRepo::exists_for_course(&state.pool, course_id).await?;
    let decision = decide_branch(MutationKind::Remove, has_enrollments);

    let version = match decision {
        BranchDecision::InPlace => {
            let deleted = VideoRepo::soft_delete(&state.pool, id).await?;
            if !deleted {
                return Err(AppError::Core(CoreError::NotFound {
                    entity: "Video",
                    id,
                }));
            }
            refreshed_current(&state.pool, &course).await?
        }
        BranchDecision::Fork => {
            let fork = ForkCourseVersion {
                course_id,
                expected_version: course.current_version,
                change_log: Some(default_change_log("Removed", "video", &video.title_primary)),
                created_by: Some(admin.user_id),
            };
            match CourseVersionRepo::fork(&state.pool, &fork, &ForkChange::RemoveVideo(id)).await? {
                ForkResult::Forked(version) => version,
                ForkResult::Conflict => {
                    return Err(AppError::Core(CoreError::Conflict(
                        "Course was modified concurrently. Retry the removal.".into(),
                    )));
                }
            }
        }
    };

    tracing::info!(
        course_id,
        video_id = id,
        version = version.version_number,
        forked = matches!(decision, BranchDecision::Fork),
        user_id = admin.user_id,
        "Video removed"
    );

    Ok(Json(DataResponse { data: version }))
}

// ---------------------------------------------------------------------------
// POST /courses/{course_id}/videos/{id}/restore
// ---------------------------------------------------------------------------

/// Undo a soft delete while the course is still in its initial-upload phase.
///
/// Once students are enrolled, restoring would silently alter the content
/// set they purchased, so the request is refused; upload the file again
/// instead (which forks).
pub async fn restore(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path((course_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let course = ensure_course_exists(&state.pool, course_id).await?;

    let has_enrollments = EnrollmentRepo::exists_for_course(&state.pool, course_id).await?;
    if let BranchDecision::Fork = decide_branch(MutationKind::Add, has_enrollments) {
        return Err(AppError::Core(CoreError::Conflict(
            "Restoring removed content would alter a purchased version. Upload the file again instead.".into(),
        )));
    }

    let restored = VideoRepo::restore(&state.pool, id, course.current_version).await?;
    if !restored {
        return Err(AppError::Core(CoreError::Conflict(
            "Video is not deleted or belongs to a superseded version".into(),
        )));
    }

    let version = refreshed_current(&state.pool, &course).await?;
    tracing::info!(course_id, video_id = id, "Video restored");

    Ok(Json(DataResponse { data: version }))
}
