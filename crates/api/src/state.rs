use std::sync::Arc;

use coursebase_blob::BlobStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: coursebase_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Blob store for course content objects. Handlers upload through it and
    /// request signed download URLs; they never hand out raw keys.
    pub blob: Arc<dyn BlobStore>,
}
