use coursebase_blob::S3Settings;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `300`). Must be long enough
    /// for the largest multipart video upload, not just JSON traffic.
    pub request_timeout_secs: u64,
    /// Maximum accepted upload body size in bytes (default: 2 GiB).
    pub max_upload_bytes: usize,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Blob store backend selection and signing parameters.
    pub blob: BlobConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `300`                      |
    /// | `MAX_UPLOAD_BYTES`     | `2147483648`               |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| (2usize * 1024 * 1024 * 1024).to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let jwt = JwtConfig::from_env();
        let blob = BlobConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            jwt,
            blob,
        }
    }
}

/// Which blob store implementation backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobBackend {
    /// In-process store; objects vanish on restart. Dev and test only.
    Memory,
    /// S3 or any S3-compatible service (MinIO, R2).
    S3,
}

impl BlobBackend {
    /// Stable lowercase name, matching what `BLOB_BACKEND` accepts.
    pub fn label(self) -> &'static str {
        match self {
            BlobBackend::Memory => "memory",
            BlobBackend::S3 => "s3",
        }
    }
}

/// Blob store configuration.
#[derive(Debug, Clone)]
pub struct BlobConfig {
    pub backend: BlobBackend,
    /// Lifetime of signed download URLs in seconds (default: `3600`).
    pub signed_url_ttl_secs: u64,
    /// S3 connection settings. Present exactly when `backend` is [`BlobBackend::S3`].
    pub s3: Option<S3Settings>,
}

impl BlobConfig {
    /// Load blob store configuration from environment variables.
    ///
    /// | Env Var                | Default  | Notes                       |
    /// |------------------------|----------|-----------------------------|
    /// | `BLOB_BACKEND`         | `memory` | `memory` or `s3`            |
    /// | `SIGNED_URL_TTL_SECS`  | `3600`   |                             |
    /// | `S3_BUCKET`            | --       | required when backend is s3 |
    /// | `S3_REGION`            | `us-east-1` |                          |
    /// | `S3_ENDPOINT_URL`      | --       | optional, for MinIO/R2      |
    /// | `S3_ACCESS_KEY_ID`     | --       | optional, else provider chain |
    /// | `S3_SECRET_ACCESS_KEY` | --       | optional, else provider chain |
    ///
    /// # Panics
    ///
    /// Panics if `BLOB_BACKEND` is unrecognized, or is `s3` without `S3_BUCKET`.
    pub fn from_env() -> Self {
        let backend_name = std::env::var("BLOB_BACKEND").unwrap_or_else(|_| "memory".into());
        let backend = match backend_name.as_str() {
            "memory" => BlobBackend::Memory,
            "s3" => BlobBackend::S3,
            other => panic!("BLOB_BACKEND must be 'memory' or 's3', got '{other}'"),
        };

        let signed_url_ttl_secs: u64 = std::env::var("SIGNED_URL_TTL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("SIGNED_URL_TTL_SECS must be a valid u64");

        let s3 = match backend {
            BlobBackend::Memory => None,
            BlobBackend::S3 => Some(S3Settings {
                bucket: std::env::var("S3_BUCKET")
                    .expect("S3_BUCKET must be set when BLOB_BACKEND=s3"),
                region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
                endpoint_url: std::env::var("S3_ENDPOINT_URL").ok(),
                access_key_id: std::env::var("S3_ACCESS_KEY_ID").ok(),
                secret_access_key: std::env::var("S3_SECRET_ACCESS_KEY").ok(),
            }),
        };

        Self {
            backend,
            signed_url_ttl_secs,
            s3,
        }
    }

    /// Signed URL lifetime as a [`std::time::Duration`].
    pub fn signed_url_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.signed_url_ttl_secs)
    }
}
