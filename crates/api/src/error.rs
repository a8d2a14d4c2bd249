//! HTTP error mapping.
//!
//! Every handler failure converges on [`AppError`], which renders as
//! `{ "error": <message>, "code": <CODE> }`. Messages for 4xx responses are
//! written for the client; anything that maps to a 5xx is replaced with a
//! fixed sanitized message and the detail goes to the log instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use coursebase_blob::BlobError;
use coursebase_core::error::CoreError;
use serde_json::json;

const INTERNAL_MSG: &str = "An internal error occurred";
const BLOB_DOWN_MSG: &str = "Object storage is temporarily unavailable";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Domain error from `coursebase_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Blob store error: {0}")]
    Blob(#[from] BlobError),

    /// Malformed input that never reached domain validation, such as a
    /// broken multipart body or an unparseable field.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A "cannot happen" state; the message is log-only.
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Status, machine-readable code, and client-facing message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(core) => core_parts(core),
            AppError::Database(err) => sqlx_parts(err),
            AppError::Blob(err) => blob_parts(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", INTERNAL_MSG.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        // One log site for everything severe; the Display impl carries the
        // unsanitized detail that the response body omits.
        if status.is_server_error() {
            tracing::error!(status = %status, code, detail = %self, "Request failed");
        }

        let body = json!({
            "error": message,
            "code": code,
        });
        (status, axum::Json(body)).into_response()
    }
}

fn core_parts(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::SlugNotFound { entity, slug } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with slug '{slug}' not found"),
        ),
        CoreError::VersionNotFound { course_id, version } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Version {version} not found for course {course_id}"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::BlobUnavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "BLOB_UNAVAILABLE",
            BLOB_DOWN_MSG.to_string(),
        ),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", INTERNAL_MSG.to_string())
        }
    }
}

/// `RowNotFound` is a straight 404. A unique-constraint violation (Postgres
/// 23505 on one of our `uq_` constraints) is the client's conflict, not our
/// fault, so it maps to 409. Every other database failure is a sanitized 500.
fn sqlx_parts(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some("23505")
                && db_err.constraint().is_some_and(|c| c.starts_with("uq_")) =>
        {
            let constraint = db_err.constraint().unwrap_or("unknown");
            (
                StatusCode::CONFLICT,
                "CONFLICT",
                format!("Duplicate value violates unique constraint: {constraint}"),
            )
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", INTERNAL_MSG.to_string()),
    }
}

/// A key the database references but the store lacks is a dangling pointer:
/// report 404, and log the key so the mismatch can be chased. Store outages
/// are 503 so clients know to retry rather than give up.
fn blob_parts(err: &BlobError) -> (StatusCode, &'static str, String) {
    match err {
        BlobError::NotFound(key) => {
            tracing::warn!(key = %key, "Blob missing for stored key");
            (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Stored object not found".to_string(),
            )
        }
        BlobError::Unavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "BLOB_UNAVAILABLE",
            BLOB_DOWN_MSG.to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_slug_is_a_domain_404_naming_the_slug() {
        let err = AppError::Core(CoreError::SlugNotFound {
            entity: "Course",
            slug: "rust-essentials".to_string(),
        });
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
        assert_eq!(message, "Course with slug 'rust-essentials' not found");
    }

    #[test]
    fn missing_id_is_a_domain_404_naming_the_id() {
        let err = AppError::Core(CoreError::NotFound {
            entity: "Video",
            id: 42,
        });
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
        assert_eq!(message, "Video with id 42 not found");
    }

    #[test]
    fn internal_detail_never_reaches_the_client() {
        let err = AppError::InternalError("pool exhausted: 32/32".to_string());
        let (status, _, message) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, INTERNAL_MSG);
    }
}
