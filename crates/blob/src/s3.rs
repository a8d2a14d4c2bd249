//! S3-compatible blob storage provider.
//!
//! Works against AWS S3 proper and against MinIO-style endpoints when
//! `endpoint_url` is set (path-style addressing is forced in that case).

use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_smithy_types::error::display::DisplayErrorContext;

use crate::{BlobError, BlobStore};

/// Connection settings for [`S3BlobStore`].
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible stores. `None` means AWS S3.
    pub endpoint_url: Option<String>,
    /// Static credentials. When unset the SDK's default provider chain is
    /// used (env vars, instance profile, ...).
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

/// Blob storage backed by an S3 bucket.
#[derive(Clone)]
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3BlobStore {
    /// Builds a client from `settings`. Does not touch the network; the first
    /// request surfaces connectivity problems.
    pub async fn connect(settings: &S3Settings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));

        if let (Some(key_id), Some(secret)) = (
            settings.access_key_id.as_deref(),
            settings.secret_access_key.as_deref(),
        ) {
            loader = loader.credentials_provider(Credentials::new(
                key_id,
                secret,
                None,
                None,
                "coursebase-static",
            ));
        }

        let shared = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &settings.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket: settings.bucket.clone(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BlobError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| BlobError::Unavailable(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!(key, size, "uploaded blob");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| BlobError::Unavailable(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!(key, "deleted blob");
        Ok(())
    }

    async fn sign_get(
        &self,
        key: &str,
        ttl: Duration,
        content_type: Option<&str>,
    ) -> Result<String, BlobError> {
        let config = PresigningConfig::expires_in(ttl)
            .map_err(|e| BlobError::Unavailable(e.to_string()))?;

        let mut request = self.client.get_object().bucket(&self.bucket).key(key);
        if let Some(ct) = content_type {
            request = request.response_content_type(ct);
        }

        let presigned = request
            .presigned(config)
            .await
            .map_err(|e| BlobError::Unavailable(DisplayErrorContext(&e).to_string()))?;

        Ok(presigned.uri().to_string())
    }
}
