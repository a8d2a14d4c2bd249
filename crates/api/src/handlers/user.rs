//! Admin user-management handlers under `/admin/users`.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use coursebase_core::error::CoreError;
use coursebase_core::roles::validate_role;
use coursebase_core::types::DbId;
use coursebase_db::models::user::{UpdateUser, UserResponse};
use coursebase_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /admin/users
// ---------------------------------------------------------------------------

/// List all users, newest first.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<impl IntoResponse> {
    let users = UserRepo::list(&state.pool).await?;
    let data: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// GET /admin/users/{id}
// ---------------------------------------------------------------------------

/// Get one user.
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

// ---------------------------------------------------------------------------
// PATCH /admin/users/{id}
// ---------------------------------------------------------------------------

/// Update a user's profile, role, or active flag.
///
/// Deactivation (`is_active = false`) locks the account out of new logins
/// and token refreshes without destroying its enrollments.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateUser>,
) -> AppResult<impl IntoResponse> {
    if let Some(ref role) = body.role {
        validate_role(role)?;
    }

    // Admins cannot strip their own role or deactivate themselves; another
    // admin has to do it.
    if id == admin.user_id {
        let demotes = body.role.as_deref().is_some_and(|r| r != admin.role);
        let deactivates = body.is_active == Some(false);
        if demotes || deactivates {
            return Err(AppError::Core(CoreError::Conflict(
                "Admins cannot demote or deactivate their own account".into(),
            )));
        }
    }

    let user = UserRepo::update(&state.pool, id, &body)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(user_id = id, updated_by = admin.user_id, "User updated");

    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}
