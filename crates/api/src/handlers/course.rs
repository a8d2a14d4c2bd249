//! Handlers for the `/courses` resource: catalog reads, creation, metadata
//! updates, archival, and thumbnail upload.
//!
//! There is no delete: a course's lifecycle ends at archival, which hides it
//! from the catalog while enrolled students keep access. Version history and
//! the purchase ledger are permanent.

use std::io::Cursor;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use coursebase_blob::{BlobError, BlobStore};
use coursebase_core::blobkey::{slugify, thumbnail_key};
use coursebase_core::error::CoreError;
use coursebase_core::localized::{LocalizedInput, LocalizedText};
use coursebase_core::types::{DbId, Timestamp, VersionNumber};
use coursebase_core::uploads::validate_thumbnail_mime;
use coursebase_db::models::course::{Course, CreateCourse, UpdateCourse};
use coursebase_db::repositories::CourseRepo;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::access::Viewer;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /courses`.
#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    /// Explicit slug; derived from the primary title when omitted.
    pub slug: Option<String>,
    pub title: LocalizedInput,
    pub description: Option<LocalizedInput>,
}

/// Request body for `PATCH /courses/{id}`. The slug is immutable because
/// stored blob keys embed it.
#[derive(Debug, Deserialize)]
pub struct UpdateCourseRequest {
    pub title: Option<LocalizedInput>,
    pub description: Option<LocalizedInput>,
}

/// A course as served to API clients: the row minus the raw thumbnail key,
/// plus a signed thumbnail URL.
#[derive(Debug, Serialize)]
pub struct CourseView {
    pub id: DbId,
    pub slug: String,
    pub title_primary: String,
    pub title_secondary: Option<String>,
    pub description_primary: Option<String>,
    pub description_secondary: Option<String>,
    pub thumbnail_url: Option<String>,
    pub current_version: VersionNumber,
    pub created_by: Option<DbId>,
    pub archived_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CourseView {
    /// Build the client view, signing the thumbnail when one is set.
    ///
    /// A dangling thumbnail key degrades to `None` instead of failing the
    /// whole response; thumbnails are cosmetic.
    pub async fn build(state: &AppState, course: Course) -> AppResult<CourseView> {
        let thumbnail_url = match &course.thumbnail_key {
            Some(key) => {
                match state
                    .blob
                    .sign_get(key, state.config.blob.signed_url_ttl(), None)
                    .await
                {
                    Ok(url) => Some(url),
                    Err(BlobError::NotFound(_)) => {
                        tracing::warn!(course_id = course.id, key = %key, "Thumbnail blob missing");
                        None
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            None => None,
        };

        Ok(CourseView {
            id: course.id,
            slug: course.slug,
            title_primary: course.title_primary,
            title_secondary: course.title_secondary,
            description_primary: course.description_primary,
            description_secondary: course.description_secondary,
            thumbnail_url,
            current_version: course.current_version,
            created_by: course.created_by,
            archived_at: course.archived_at,
            created_at: course.created_at,
            updated_at: course.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify that a course exists, returning the full row.
pub async fn ensure_course_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<Course> {
    CourseRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        })
    })
}

/// Empty-after-trim strings collapse to `None` for nullable columns.
fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

// ---------------------------------------------------------------------------
// GET /courses
// ---------------------------------------------------------------------------

/// List unarchived courses, newest first. Public.
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let courses = CourseRepo::list(&state.pool).await?;

    let views = try_join_all(
        courses
            .into_iter()
            .map(|course| CourseView::build(&state, course)),
    )
    .await?;

    Ok(Json(DataResponse { data: views }))
}

// ---------------------------------------------------------------------------
// GET /courses/{id}
// ---------------------------------------------------------------------------

/// Get a single course. Archived courses are only visible to admins and
/// enrolled students.
pub async fn get_by_id(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let course = ensure_course_exists(&state.pool, id).await?;
    Viewer::resolve(&state.pool, user.as_ref(), &course, None).await?;

    let view = CourseView::build(&state, course).await?;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// GET /courses/slug/{slug}
// ---------------------------------------------------------------------------

/// Get a single course by its URL slug.
pub async fn get_by_slug(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let course = CourseRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::SlugNotFound {
                entity: "Course",
                slug: slug.clone(),
            })
        })?;
    Viewer::resolve(&state.pool, user.as_ref(), &course, None).await?;

    let view = CourseView::build(&state, course).await?;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// POST /courses
// ---------------------------------------------------------------------------

/// Create a course. Version 1 is allocated alongside the row.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(body): Json<CreateCourseRequest>,
) -> AppResult<impl IntoResponse> {
    let title = LocalizedText::from(body.title);
    title.require_primary("title")?;

    let slug = match body.slug {
        Some(s) if !s.trim().is_empty() => slugify(&s),
        _ => slugify(&title.primary),
    };

    let description = body.description.map(LocalizedText::from);

    let course = CourseRepo::create(
        &state.pool,
        &CreateCourse {
            slug,
            title_primary: title.primary,
            title_secondary: non_empty(title.secondary),
            description_primary: description.as_ref().and_then(|d| non_empty(d.primary.clone())),
            description_secondary: description
                .as_ref()
                .and_then(|d| non_empty(d.secondary.clone())),
            created_by: Some(admin.user_id),
        },
    )
    .await?;

    tracing::info!(
        course_id = course.id,
        slug = %course.slug,
        user_id = admin.user_id,
        "Course created"
    );

    let view = CourseView::build(&state, course).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

// ---------------------------------------------------------------------------
// PATCH /courses/{id}
// ---------------------------------------------------------------------------

/// Update course metadata. Never touches versions or content rows.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateCourseRequest>,
) -> AppResult<impl IntoResponse> {
    let title = body.title.map(LocalizedText::from);
    if let Some(ref t) = title {
        t.require_primary("title")?;
    }
    let description = body.description.map(LocalizedText::from);

    let input = UpdateCourse {
        title_primary: title.as_ref().map(|t| t.primary.clone()),
        title_secondary: title.as_ref().and_then(|t| non_empty(t.secondary.clone())),
        description_primary: description.as_ref().and_then(|d| non_empty(d.primary.clone())),
        description_secondary: description
            .as_ref()
            .and_then(|d| non_empty(d.secondary.clone())),
    };

    let course = CourseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Course",
                id,
            })
        })?;

    tracing::info!(course_id = id, "Course metadata updated");

    let view = CourseView::build(&state, course).await?;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// POST /courses/{id}/thumbnail
// ---------------------------------------------------------------------------

/// Upload or replace the course thumbnail.
///
/// Accepts a multipart form with a single `file` field. The image header is
/// decoded to confirm the payload really is an image before it is stored.
/// Thumbnails are exempt from versioning; the key is simply replaced.
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let course = ensure_course_exists(&state.pool, id).await?;

    let mut file_data: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            let filename = field.file_name().unwrap_or("thumbnail.png").to_string();
            let content_type = field.content_type().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            file_data = Some((filename, content_type, data.to_vec()));
        }
    }

    let (filename, content_type, data) =
        file_data.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    validate_thumbnail_mime(&content_type)?;

    // Decode the header only: confirms the format and yields dimensions
    // without decompressing the full image.
    let (width, height) = image::ImageReader::new(Cursor::new(&data))
        .with_guessed_format()
        .map_err(|e| AppError::BadRequest(format!("Unreadable image data: {e}")))?
        .into_dimensions()
        .map_err(|e| {
            AppError::Core(CoreError::Validation(format!(
                "File is not a decodable image: {e}"
            )))
        })?;

    let key = thumbnail_key(&course.slug, chrono::Utc::now().timestamp(), &filename);
    state.blob.put(&key, data, &content_type).await?;

    let updated = CourseRepo::set_thumbnail(&state.pool, id, &key)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Course",
                id,
            })
        })?;

    tracing::info!(
        course_id = id,
        user_id = admin.user_id,
        width,
        height,
        "Thumbnail uploaded"
    );

    let view = CourseView::build(&state, updated).await?;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// POST /courses/{id}/archive, POST /courses/{id}/unarchive
// ---------------------------------------------------------------------------

/// Archive a course: hidden from the catalog, enrolled students keep access.
pub async fn archive(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let archived = CourseRepo::archive(&state.pool, id).await?;
    if !archived {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }));
    }
    tracing::info!(course_id = id, "Course archived");
    Ok(StatusCode::NO_CONTENT)
}

/// Return an archived course to the catalog.
pub async fn unarchive(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let unarchived = CourseRepo::unarchive(&state.pool, id).await?;
    if !unarchived {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }));
    }
    tracing::info!(course_id = id, "Course unarchived");
    Ok(StatusCode::NO_CONTENT)
}
