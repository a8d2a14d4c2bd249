//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireAuth`] -- Requires any authenticated user.
//!
//! Catalog endpoints take `Option<AuthUser>`: anonymous browsing is allowed,
//! but a presented token still decides which content is unlocked.

pub mod auth;
pub mod rbac;
