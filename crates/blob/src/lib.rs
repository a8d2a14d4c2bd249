//! Object storage providers behind the [`BlobStore`] trait.
//!
//! Blobs are immutable once written: content edits upload a new object under a
//! new key and flip the referencing row, they never rewrite an existing key.
//! Deletion exists on the trait for the out-of-band garbage collector only;
//! request handlers must not call it.

use std::time::Duration;

use async_trait::async_trait;

mod memory;
mod s3;

pub use memory::MemoryBlobStore;
pub use s3::{S3BlobStore, S3Settings};

/// Default lifetime for signed download URLs.
pub const DEFAULT_SIGNED_URL_TTL: Duration = Duration::from_secs(60 * 60);

/// Errors from blob storage providers.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// No object exists under the requested key.
    #[error("Blob not found: {0}")]
    NotFound(String),

    /// The provider rejected the request or could not be reached.
    #[error("Blob store unavailable: {0}")]
    Unavailable(String),
}

/// Storage operations for course content objects.
///
/// Implementations must make `put` durable before returning: a key handed back
/// to the caller is expected to outlive the process and stay readable for as
/// long as any content row references it.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `key`, overwriting any existing object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BlobError>;

    /// Removes the object under `key`.
    ///
    /// Reserved for offline reclamation of unreferenced keys. Nothing in the
    /// request path calls this: soft-deleted and superseded rows keep their
    /// blobs so that older course versions stay playable.
    async fn delete(&self, key: &str) -> Result<(), BlobError>;

    /// Produces a time-limited signed download URL for `key`.
    ///
    /// `content_type` overrides the response Content-Type when the provider
    /// supports it, so browsers render PDFs inline instead of downloading.
    async fn sign_get(
        &self,
        key: &str,
        ttl: Duration,
        content_type: Option<&str>,
    ) -> Result<String, BlobError>;
}
