//! Postgres persistence layer: connection pool helpers, entity models, and
//! table repositories.
//!
//! Repositories never mutate rows belonging to a superseded course version;
//! the copy-on-write fork in
//! [`repositories::course_version_repo::CourseVersionRepo`] is the only way a
//! new version comes into existence.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub mod models;
pub mod repositories;

/// Convenience alias used throughout the workspace.
pub type DbPool = PgPool;

/// Default maximum connections when `DATABASE_MAX_CONNECTIONS` is not set.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Create a connection pool from a Postgres URL.
///
/// Pool size comes from `DATABASE_MAX_CONNECTIONS` when set.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_CONNECTIONS);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
