//! In-memory blob storage for tests and local development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{BlobError, BlobStore};

struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// Map-backed [`BlobStore`] that also counts `delete` calls, so tests can
/// assert that soft-delete paths never reach the store.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    delete_calls: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when an object exists under `key`.
    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    /// Number of stored objects.
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Bytes stored under `key`, if any.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(key).map(|o| o.bytes.clone())
    }

    /// Stored Content-Type for `key`, if any.
    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.content_type.clone())
    }

    /// How many times `delete` has been invoked, successful or not.
    pub fn delete_call_count(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BlobError> {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        match self.objects.write().await.remove(key) {
            Some(_) => Ok(()),
            None => Err(BlobError::NotFound(key.to_string())),
        }
    }

    async fn sign_get(
        &self,
        key: &str,
        ttl: Duration,
        _content_type: Option<&str>,
    ) -> Result<String, BlobError> {
        if !self.contains(key).await {
            return Err(BlobError::NotFound(key.to_string()));
        }
        Ok(format!("memory://{}?expires_in={}", key, ttl.as_secs()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- put / get -----------------------------------------------------------

    #[tokio::test]
    async fn put_then_get_returns_bytes() {
        let store = MemoryBlobStore::new();

        store
            .put("courses/rust/v1/videos/1_intro.mp4", b"frames".to_vec(), "video/mp4")
            .await
            .unwrap();

        assert_eq!(
            store.get("courses/rust/v1/videos/1_intro.mp4").await,
            Some(b"frames".to_vec())
        );
        assert_eq!(
            store.content_type("courses/rust/v1/videos/1_intro.mp4").await,
            Some("video/mp4".to_string())
        );
    }

    #[tokio::test]
    async fn put_overwrites_existing_key() {
        let store = MemoryBlobStore::new();

        store.put("k", b"old".to_vec(), "text/plain").await.unwrap();
        store.put("k", b"new".to_vec(), "text/plain").await.unwrap();

        assert_eq!(store.get("k").await, Some(b"new".to_vec()));
        assert_eq!(store.object_count().await, 1);
    }

    // -- sign_get ------------------------------------------------------------

    #[tokio::test]
    async fn sign_get_returns_url_for_existing_key() {
        let store = MemoryBlobStore::new();
        store.put("k", b"x".to_vec(), "application/pdf").await.unwrap();

        let url = store
            .sign_get("k", Duration::from_secs(600), Some("application/pdf"))
            .await
            .unwrap();

        assert!(url.starts_with("memory://k"));
        assert!(url.ends_with("expires_in=600"));
    }

    #[tokio::test]
    async fn sign_get_unknown_key_is_not_found() {
        let store = MemoryBlobStore::new();

        let err = store
            .sign_get("missing", Duration::from_secs(60), None)
            .await
            .unwrap_err();

        assert!(matches!(err, BlobError::NotFound(_)));
    }

    // -- delete accounting ---------------------------------------------------

    #[tokio::test]
    async fn delete_removes_object_and_is_counted() {
        let store = MemoryBlobStore::new();
        store.put("k", b"x".to_vec(), "text/plain").await.unwrap();

        store.delete("k").await.unwrap();

        assert!(!store.contains("k").await);
        assert_eq!(store.delete_call_count(), 1);
    }

    #[tokio::test]
    async fn delete_of_missing_key_errors_but_still_counts() {
        let store = MemoryBlobStore::new();

        let err = store.delete("missing").await.unwrap_err();

        assert!(matches!(err, BlobError::NotFound(_)));
        assert_eq!(store.delete_call_count(), 1);
    }

    #[tokio::test]
    async fn fresh_store_has_no_delete_calls() {
        let store = MemoryBlobStore::new();

        store.put("a", b"1".to_vec(), "text/plain").await.unwrap();
        store.put("b", b"2".to_vec(), "text/plain").await.unwrap();
        let _ = store.sign_get("a", Duration::from_secs(60), None).await;

        assert_eq!(store.delete_call_count(), 0);
    }
}
