//! Handlers for enrollments: the purchase records that pin students to a
//! course version.
//!
//! Enrollment rows are written here and read by the access layer; nothing
//! ever updates `course_version` on an existing row.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use coursebase_core::error::CoreError;
use coursebase_core::types::DbId;
use coursebase_db::models::enrollment::CreateEnrollment;
use coursebase_db::repositories::{EnrollmentRepo, UserRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::course::ensure_course_exists;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for the admin enrollment grant.
#[derive(Debug, Deserialize)]
pub struct AdminEnrollRequest {
    pub user_id: DbId,
}

// ---------------------------------------------------------------------------
// POST /courses/{course_id}/enroll
// ---------------------------------------------------------------------------

/// Enroll the calling user in a course at its current version.
///
/// Stands in for payment completion; a checkout flow would call this after
/// the charge clears. Archived courses are closed to new enrollment, and a
/// second enrollment in the same course is a conflict.
pub async fn enroll_self(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(course_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let course = ensure_course_exists(&state.pool, course_id).await?;
    if course.archived_at.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Course is archived and closed to new enrollment".into(),
        )));
    }

    let enrollment = EnrollmentRepo::create(
        &state.pool,
        &CreateEnrollment {
            user_id: user.user_id,
            course_id,
            course_version: course.current_version,
        },
    )
    .await?;

    tracing::info!(
        course_id,
        user_id = user.user_id,
        version = enrollment.course_version,
        "User enrolled"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: enrollment })))
}

// ---------------------------------------------------------------------------
// POST /courses/{course_id}/enrollments
// ---------------------------------------------------------------------------

/// Grant an enrollment to another user. Admin only.
///
/// Unlike self-enrollment this works on archived courses too, for manual
/// grants and refund reversals.
pub async fn admin_enroll(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(course_id): Path<DbId>,
    Json(body): Json<AdminEnrollRequest>,
) -> AppResult<impl IntoResponse> {
    let course = ensure_course_exists(&state.pool, course_id).await?;
    UserRepo::find_by_id(&state.pool, body.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: body.user_id,
        }))?;

    let enrollment = EnrollmentRepo::create(
        &state.pool,
        &CreateEnrollment {
            user_id: body.user_id,
            course_id,
            course_version: course.current_version,
        },
    )
    .await?;

    tracing::info!(
        course_id,
        user_id = body.user_id,
        granted_by = admin.user_id,
        version = enrollment.course_version,
        "Enrollment granted"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: enrollment })))
}

// ---------------------------------------------------------------------------
// GET /courses/{course_id}/enrollments
// ---------------------------------------------------------------------------

/// The course's enrollment roster with student identity. Admin only.
pub async fn list_for_course(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(course_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_course_exists(&state.pool, course_id).await?;
    let roster = EnrollmentRepo::list_by_course_with_user(&state.pool, course_id).await?;
    Ok(Json(DataResponse { data: roster }))
}

// ---------------------------------------------------------------------------
// GET /user/enrollments
// ---------------------------------------------------------------------------

/// The calling user's enrollments with course identity and the pinned
/// version each one is entitled to.
pub async fn my_enrollments(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> AppResult<impl IntoResponse> {
    let enrollments = EnrollmentRepo::list_by_user_with_course(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: enrollments }))
}
