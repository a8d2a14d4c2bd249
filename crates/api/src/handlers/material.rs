//! Handlers for the `/courses/{course_id}/materials` resource.
//!
//! Materials follow the same branch decision as videos but are purchase-only:
//! there is no free-preview flag, so locked materials never carry a URL.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use coursebase_core::blobkey::material_key;
use coursebase_core::error::CoreError;
use coursebase_core::localized::{LocalizedInput, LocalizedText};
use coursebase_core::types::{DbId, VersionNumber};
use coursebase_core::uploads::validate_material_upload;
use coursebase_core::versioning::{
    decide_branch, ensure_current_version, validate_change_log, BranchDecision, MutationKind,
};
use coursebase_db::models::course_version::CourseVersion;
use coursebase_db::models::material::{CreateMaterial, Material, UpdateMaterial};
use coursebase_db::repositories::course_version_repo::{
    ForkChange, ForkCourseVersion, ForkResult,
};
use coursebase_db::repositories::{CourseVersionRepo, EnrollmentRepo, MaterialRepo};
use serde::{Deserialize, Serialize};

use crate::access::{annotate_material, annotate_materials, MaterialView, Viewer};
use crate::error::{AppError, AppResult};
use crate::handlers::course::ensure_course_exists;
use crate::handlers::video::{default_change_log, refreshed_current, VersionQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `PATCH .../materials/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateMaterialRequest {
    pub title: Option<LocalizedInput>,
    pub position: Option<i32>,
}

/// The affected material plus the version snapshot it now belongs to.
#[derive(Debug, Serialize)]
pub struct MaterialMutationResponse {
    pub material: MaterialView,
    pub version: CourseVersion,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn admin_viewer(version: VersionNumber) -> Viewer {
    Viewer {
        is_admin: true,
        purchased: false,
        version,
    }
}

async fn ensure_material_in_course(
    pool: &sqlx::PgPool,
    course_id: DbId,
    id: DbId,
) -> AppResult<Material> {
    let material = MaterialRepo::find_by_id(pool, id)
        .await?
        .filter(|m| m.course_id == course_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Material",
            id,
        }))?;
    Ok(material)
}

// ---------------------------------------------------------------------------
// POST /courses/{course_id}/materials
// ---------------------------------------------------------------------------

/// Upload a supplementary material.
///
/// Multipart form fields: `file` (required), `title` (required), `position`
/// and `change_log` (optional). Materials are size-capped; the blob is
/// stored before any row is written.
pub async fn upload(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(course_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let course = ensure_course_exists(&state.pool, course_id).await?;

    let mut file_data: Option<(String, String, Vec<u8>)> = None;
    let mut title: Option<LocalizedText> = None;
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
                let filename = field.file_name().unwrap_or("upload.bin").to_string();
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
    let file_size_bytes = data.len() as i64;
    validate_material_upload(&content_type, file_size_bytes)?;
    if let Some(ref log) = change_log {
        validate_change_log(log)?;
    }

    let has_enrollments = EnrollmentRepo::exists_for_course(&state.pool, course_id).await?;
    let decision = decide_branch(MutationKind::Add, has_enrollments);
    let target_version = match decision {
        BranchDecision::InPlace => course.current_version,
        BranchDecision::Fork => course.current_version + 1,
    };

    let key = material_key(&course.slug, target_version, Utc::now().timestamp(), &filename);
    state.blob.put(&key, data, &content_type).await?;

    let input = CreateMaterial {
        course_id,
        title_primary: title.primary.clone(),
        title_secondary: non_empty(title.secondary),
        blob_key: key.clone(),
        original_filename: filename,
        mime_type: content_type,
        file_size_bytes,
        position,
    };

    let (material, version) = match decision {
        BranchDecision::InPlace => {
            let material =
                MaterialRepo::create(&state.pool, course.current_version, &input).await?;
            let version = refreshed_current(&state.pool, &course).await?;
            (material, version)
        }
        BranchDecision::Fork => {
            let log = change_log
                .unwrap_or_else(|| default_change_log("Added", "material", &title.primary));
            let fork = ForkCourseVersion {
                course_id,
                expected_version: course.current_version,
                change_log: Some(log),
                created_by: Some(admin.user_id),
            };
            let version = match CourseVersionRepo::fork(
                &state.pool,
                &fork,
                &ForkChange::AddMaterial(input),
            )
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
            let material =
                MaterialRepo::list_for_version(&state.pool, course_id, version.version_number)
                    .await?
                    .into_iter()
                    .find(|m| m.blob_key == key)
                    .ok_or_else(|| {
                        AppError::InternalError(format!(
                            "Forked version {} of course {} is missing the uploaded material",
                            version.version_number, course_id
                        ))
                    })?;
            (material, version)
        }
    };

    tracing::info!(
        course_id,
        material_id = material.id,
        version = version.version_number,
        forked = matches!(decision, BranchDecision::Fork),
        user_id = admin.user_id,
        "Material uploaded"
    );

    let viewer = admin_viewer(version.version_number);
    let view = annotate_material(
        state.blob.as_ref(),
        state.config.blob.signed_url_ttl(),
        material,
        &viewer,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: MaterialMutationResponse {
                material: view,
                version,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /courses/{course_id}/materials
// ---------------------------------------------------------------------------

/// List the materials of the viewer's entitled version.
pub async fn list(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(course_id): Path<DbId>,
    Query(query): Query<VersionQuery>,
) -> AppResult<impl IntoResponse> {
    let course = ensure_course_exists(&state.pool, course_id).await?;
    let viewer = Viewer::resolve(&state.pool, user.as_ref(), &course, query.version).await?;

    let materials = MaterialRepo::list_for_version(&state.pool, course_id, viewer.version).await?;
    let views = annotate_materials(
        state.blob.as_ref(),
        state.config.blob.signed_url_ttl(),
        materials,
        &viewer,
    )
    .await?;

    Ok(Json(DataResponse { data: views }))
}

// ---------------------------------------------------------------------------
// GET /courses/{course_id}/materials/{id}
// ---------------------------------------------------------------------------

/// Get one material. Non-admin viewers only see rows of their entitled
/// version.
pub async fn get_by_id(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path((course_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let course = ensure_course_exists(&state.pool, course_id).await?;
    let viewer = Viewer::resolve(&state.pool, user.as_ref(), &course, None).await?;

    let material = ensure_material_in_course(&state.pool, course_id, id).await?;
    if !viewer.is_admin && material.course_version != viewer.version {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Material",
            id,
        }));
    }

    let view = annotate_material(
        state.blob.as_ref(),
        state.config.blob.signed_url_ttl(),
        material,
        &viewer,
    )
    .await?;

    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// PATCH /courses/{course_id}/materials/{id}
// ---------------------------------------------------------------------------

/// Edit material metadata in place. Never forks; superseded-version rows
/// are frozen and cannot be edited.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path((course_id, id)): Path<(DbId, DbId)>,
    Json(body): Json<UpdateMaterialRequest>,
) -> AppResult<impl IntoResponse> {
    let course = ensure_course_exists(&state.pool, course_id).await?;
    let material = ensure_material_in_course(&state.pool, course_id, id).await?;
    ensure_current_version(material.course_version, course.current_version)?;

    let title = body.title.map(LocalizedText::from);
    if let Some(ref t) = title {
        t.require_primary("title")?;
    }

    let input = UpdateMaterial {
        title_primary: title.as_ref().map(|t| t.primary.clone()),
        title_secondary: title.as_ref().and_then(|t| non_empty(t.secondary.clone())),
        position: body.position,
    };

    let material = MaterialRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Material",
            id,
        }))?;

    tracing::info!(course_id, material_id = id, "Material metadata updated");

    let viewer = admin_viewer(material.course_version);
    let view = annotate_material(
        state.blob.as_ref(),
        state.config.blob.signed_url_ttl(),
        material,
        &viewer,
    )
    .await?;

    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// DELETE /courses/{course_id}/materials/{id}
// ---------------------------------------------------------------------------

/// Remove a material from the course's current version. The stored blob is
/// never deleted; historical versions keep referencing it.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((course_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let course = ensure_course_exists(&state.pool, course_id).await?;
    let material = ensure_material_in_course(&state.pool, course_id, id).await?;
    ensure_current_version(material.course_version, course.current_version)?;

    let has_enrollments = EnrollmentRepo::exists_for_course(&state.pool, course_id).await?;
    let decision = decide_branch(MutationKind::Remove, has_enrollments);

    let version = match decision {
        BranchDecision::InPlace => {
            let deleted = MaterialRepo::soft_delete(&state.pool, id).await?;
            if !deleted {
                return Err(AppError::Core(CoreError::NotFound {
                    entity: "Material",
                    id,
                }));
            }
            refreshed_current(&state.pool, &course).await?
        }
        BranchDecision::Fork => {
            let fork = ForkCourseVersion {
                course_id,
                expected_version: course.current_version,
                change_log: Some(default_change_log(
                    "Removed",
                    "material",
                    &material.title_primary,
                )),
                created_by: Some(admin.user_id),
            };
            match CourseVersionRepo::fork(&state.pool, &fork, &ForkChange::RemoveMaterial(id))
                .await?
            {
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
        material_id = id,
        version = version.version_number,
        forked = matches!(decision, BranchDecision::Fork),
        user_id = admin.user_id,
        "Material removed"
    );

    Ok(Json(DataResponse { data: version }))
}

// ---------------------------------------------------------------------------
// POST /courses/{course_id}/materials/{id}/restore
// ---------------------------------------------------------------------------

/// Undo a soft delete while the course is still in its initial-upload phase.
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

    let restored = MaterialRepo::restore(&state.pool, id, course.current_version).await?;
    if !restored {
        return Err(AppError::Core(CoreError::Conflict(
            "Material is not deleted or belongs to a superseded version".into(),
        )));
    }

    let version = refreshed_current(&state.pool, &course).await?;
    tracing::info!(course_id, material_id = id, "Material restored");

    Ok(Json(DataResponse { data: version }))
}
