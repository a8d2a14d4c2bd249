pub mod auth;
pub mod course;
pub mod health;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                               register (public)
/// /auth/login                                  login (public)
/// /auth/refresh                                refresh (public)
/// /auth/logout                                 logout (requires auth)
/// /auth/change-password                        change password (requires auth)
///
/// /courses                                     list, create (admin)
/// /courses/slug/{slug}                         get by slug
/// /courses/{id}                                get, update (admin)
/// /courses/{id}/archive                        archive (admin, POST)
/// /courses/{id}/unarchive                      unarchive (admin, POST)
/// /courses/{id}/thumbnail                      upload thumbnail (admin, multipart)
/// /courses/{id}/enroll                         self-enroll (auth, POST)
///
/// /courses/{course_id}/videos                  list, upload (admin, multipart)
/// /courses/{course_id}/videos/{id}             get, update (admin), remove (admin)
/// /courses/{course_id}/videos/{id}/restore     restore (admin, POST)
///
/// /courses/{course_id}/materials               list, upload (admin, multipart)
/// /courses/{course_id}/materials/{id}          get, update (admin), remove (admin)
/// /courses/{course_id}/materials/{id}/restore  restore (admin, POST)
///
/// /courses/{course_id}/versions                version history (admin)
/// /courses/{course_id}/versions/{number}       version detail + manifest (admin)
///
/// /courses/{course_id}/enrollments             roster (admin), grant (admin, POST)
///
/// /admin/users                                 list users (admin)
/// /admin/users/{id}                            get, update (admin)
///
/// /user/enrollments                            my enrollments (auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication: registration, sessions, password changes.
        .nest("/auth", auth::router())
        // Courses with nested content, version, and enrollment resources.
        .nest("/courses", course::router())
        // Admin user management.
        .nest("/admin", user::admin_router())
        // User-facing enrollment view.
        .nest("/user", user::user_router())
}
