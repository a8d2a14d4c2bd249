//! Route definitions for the `/courses` resource and its nested content,
//! version, and enrollment sub-resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{course, enrollment, material, version, video};
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// GET    /                                     list (public)
/// POST   /                                     create (admin)
/// GET    /slug/{slug}                          get_by_slug (public)
/// GET    /{id}                                 get_by_id (public)
/// PATCH  /{id}                                 update (admin)
/// POST   /{id}/archive                         archive (admin)
/// POST   /{id}/unarchive                       unarchive (admin)
/// POST   /{id}/thumbnail                       upload_thumbnail (admin, multipart)
/// POST   /{id}/enroll                          enroll_self (auth)
///
/// GET    /{course_id}/videos                   list (access-annotated)
/// POST   /{course_id}/videos                   upload (admin, multipart)
/// GET    /{course_id}/videos/{id}              get_by_id
/// PATCH  /{course_id}/videos/{id}              update (admin)
/// DELETE /{course_id}/videos/{id}              delete (admin)
/// POST   /{course_id}/videos/{id}/restore      restore (admin)
///
/// GET    /{course_id}/materials                list (access-annotated)
/// POST   /{course_id}/materials                upload (admin, multipart)
/// GET    /{course_id}/materials/{id}           get_by_id
/// PATCH  /{course_id}/materials/{id}           update (admin)
/// DELETE /{course_id}/materials/{id}           delete (admin)
/// POST   /{course_id}/materials/{id}/restore   restore (admin)
///
/// GET    /{course_id}/versions                 list (admin)
/// GET    /{course_id}/versions/{number}        get (admin)
///
/// GET    /{course_id}/enrollments              list_for_course (admin)
/// POST   /{course_id}/enrollments              admin_enroll (admin)
/// ```
pub fn router() -> Router<AppState> {
    let video_routes = Router::new()
        .route("/", get(video::list).post(video::upload))
        .route(
            "/{id}",
            get(video::get_by_id)
                .patch(video::update)
                .delete(video::delete),
        )
        .route("/{id}/restore", post(video::restore));

    let material_routes = Router::new()
        .route("/", get(material::list).post(material::upload))
        .route(
            "/{id}",
            get(material::get_by_id)
                .patch(material::update)
                .delete(material::delete),
        )
        .route("/{id}/restore", post(material::restore));

    let version_routes = Router::new()
        .route("/", get(version::list))
        .route("/{number}", get(version::get));

    let enrollment_routes = Router::new().route(
        "/",
        get(enrollment::list_for_course).post(enrollment::admin_enroll),
    );

    Router::new()
        .route("/", get(course::list).post(course::create))
        .route("/slug/{slug}", get(course::get_by_slug))
        .route("/{id}", get(course::get_by_id).patch(course::update))
        .route("/{id}/archive", post(course::archive))
        .route("/{id}/unarchive", post(course::unarchive))
        .route("/{id}/thumbnail", post(course::upload_thumbnail))
        .route("/{id}/enroll", post(enrollment::enroll_self))
        .nest("/{course_id}/videos", video_routes)
        .nest("/{course_id}/materials", material_routes)
        .nest("/{course_id}/versions", version_routes)
        .nest("/{course_id}/enrollments", enrollment_routes)
}
