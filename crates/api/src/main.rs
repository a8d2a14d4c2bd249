use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursebase_api::auth::password::hash_password;
use coursebase_api::config::{BlobBackend, ServerConfig};
use coursebase_api::router::build_app_router;
use coursebase_api::state::AppState;
use coursebase_blob::{BlobStore, MemoryBlobStore, S3BlobStore};
use coursebase_core::roles::ROLE_ADMIN;
use coursebase_db::models::user::CreateUser;
use coursebase_db::repositories::UserRepo;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coursebase_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = coursebase_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    coursebase_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    coursebase_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Blob store ---
    let blob: Arc<dyn BlobStore> = match config.blob.backend {
        BlobBackend::Memory => {
            tracing::warn!("Using in-memory blob store; stored objects will not survive a restart");
            Arc::new(MemoryBlobStore::new())
        }
        BlobBackend::S3 => {
            let settings = config
                .blob
                .s3
                .as_ref()
                .expect("S3 settings missing for s3 blob backend");
            let store = S3BlobStore::connect(settings).await;
            tracing::info!(bucket = %settings.bucket, "Connected to S3 blob store");
            Arc::new(store)
        }
    };

    // --- Bootstrap admin ---
    ensure_bootstrap_admin(&pool).await;

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        blob,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Create the initial admin account from `ADMIN_EMAIL` / `ADMIN_PASSWORD` /
/// `ADMIN_USERNAME` if it does not exist yet.
///
/// Registration only ever creates students, so a fresh deployment needs this
/// to get its first admin. No-op when the variables are unset or the account
/// already exists.
async fn ensure_bootstrap_admin(pool: &sqlx::PgPool) {
    let (Ok(email), Ok(password)) = (
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) else {
        tracing::debug!("ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping admin bootstrap");
        return;
    };
    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());

    let existing = UserRepo::find_by_email(pool, &email)
        .await
        .expect("Failed to look up bootstrap admin");
    if existing.is_some() {
        tracing::debug!(%email, "Bootstrap admin already exists");
        return;
    }

    let password_hash = hash_password(&password).expect("Failed to hash bootstrap admin password");
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username,
            email: email.clone(),
            password_hash,
            role: ROLE_ADMIN.to_string(),
        },
    )
    .await
    .expect("Failed to create bootstrap admin");

    tracing::info!(user_id = user.id, %email, "Bootstrap admin created");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
