//! Role gates, expressed as extractors.
//!
//! A handler that takes [`RequireAdmin`] cannot be reached by a student
//! token, so authorization lives in the route signature instead of inside
//! handler bodies. Both gates reuse [`AuthUser`] extraction, which means an
//! invalid token is a 401 and an insufficient role a 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use coursebase_core::error::CoreError;
use coursebase_core::roles::ROLE_ADMIN;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Admin-only gate for catalog management, version history, and user admin.
///
/// ```ignore
/// async fn upload(RequireAdmin(admin): RequireAdmin, /* ... */) -> AppResult<Json<()>> {
///     // admin.user_id is recorded as the actor on the new version row
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

/// Gate for routes any signed-in account may use, such as self-enrollment.
///
/// Carries no extra checks beyond token validation; it exists so a route
/// table reads "authenticated" where a bare [`AuthUser`] parameter would be
/// easy to miss.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        AuthUser::from_request_parts(parts, state).await.map(RequireAuth)
    }
}
