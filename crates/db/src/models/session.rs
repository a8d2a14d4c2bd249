//! Refresh-token sessions.
//!
//! A session is one issued refresh token. The table stores the token's
//! SHA-256 digest only, so rows are useless to anyone who reads them.

use coursebase_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A `sessions` row.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    /// Set on logout, password change, and token rotation.
    pub is_revoked: bool,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO for a freshly issued refresh token.
pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}
