//! Route definitions for admin user management and user-facing enrollment
//! views.

use axum::routing::get;
use axum::Router;

use crate::handlers::{enrollment, user};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET   /users       -> list
/// GET   /users/{id}  -> get_by_id
/// PATCH /users/{id}  -> update (role, active flag, profile)
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(user::list))
        .route("/users/{id}", get(user::get_by_id).patch(user::update))
}

/// Routes mounted at `/user`.
///
/// ```text
/// GET /enrollments  -> my_enrollments (auth required)
/// ```
pub fn user_router() -> Router<AppState> {
    Router::new().route("/enrollments", get(enrollment::my_enrollments))
}
