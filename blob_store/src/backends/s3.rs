//! S3 blob store backend using object_store + aws-sdk-s3 for presigning.

use std::{env, sync::Arc, time::Duration};

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{config::Region, presigning::PresigningConfig, Client as S3Client};
use bytes::Bytes;
use object_store::{
    aws::{AmazonS3, AmazonS3Builder},
    path::Path as ObjectPath,
    Attribute,
    Attributes,
    ObjectStore,
    PutOptions,
    PutPayload,
};
use tracing::debug;

use crate::{presign, presign::DownloadOptions, BlobError, BlobResult, BlobStore};

/// S3 blob store backend.
///
/// Data I/O goes through object_store; the AWS SDK client exists only to
/// sign download URLs, which object_store cannot attach response-header
/// overrides to.
pub struct S3BlobStore {
    object_store: Arc<AmazonS3>,

    s3_client: S3Client,

    /// Bucket name extracted from the base path.
    bucket: String,

    /// Optional prefix for all keys.
    prefix: String,
}

impl S3BlobStore {
    /// Create a new S3 blob store from a base URL.
    ///
    /// # Arguments
    /// * `url` - S3 URL (e.g., `s3://bucket/prefix`)
    /// * `region` - Optional AWS region override
    pub async fn new(url: &str, region: Option<String>) -> BlobResult<Self> {
        let (bucket, prefix) = Self::parse_s3_url(url)?;

        let mut builder = AmazonS3Builder::from_env().with_url(url);
        if let Some(ref r) = region {
            builder = builder.with_region(r);
        }
        // For supporting localstack/minio for testing
        if let Ok(val) = env::var("AWS_ENDPOINT_URL") {
            builder = builder.with_endpoint(val.clone());
            if val.starts_with("http://") {
                builder = builder.with_allow_http(true);
            }
        }
        let object_store = builder.build().map_err(|e| BlobError::NetworkError {
            source: anyhow::Error::from(e),
        })?;

        let mut config_loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(r) = region {
            config_loader = config_loader.region(Region::new(r));
        }
        let aws_config = config_loader.load().await;
        let s3_client = S3Client::new(&aws_config);

        debug!(bucket = %bucket, prefix = %prefix, "created S3 blob store");

        Ok(Self {
            object_store: Arc::new(object_store),
            s3_client,
            bucket,
            prefix,
        })
    }

    /// Parse an S3 URL into bucket and prefix.
    fn parse_s3_url(url: &str) -> BlobResult<(String, String)> {
        let without_scheme = url
            .strip_prefix("s3://")
            .ok_or_else(|| BlobError::InvalidUri {
                uri: url.to_string(),
                reason: "URI must start with s3://".to_string(),
            })?;

        let parts: Vec<&str> = without_scheme.splitn(2, '/').collect();
        let bucket = parts[0].to_string();
        if bucket.is_empty() {
            return Err(BlobError::InvalidUri {
                uri: url.to_string(),
                reason: "missing bucket name".to_string(),
            });
        }
        let prefix = if parts.len() > 1 {
            parts[1].trim_end_matches('/').to_string()
        } else {
            String::new()
        };

        Ok((bucket, prefix))
    }

    fn prefixed_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.prefix, key)
        }
    }

    fn key_to_path(&self, key: &str) -> ObjectPath {
        ObjectPath::from(self.prefixed_key(key))
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> BlobResult<()> {
        let path = self.key_to_path(key);

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        self.object_store
            .put_opts(&path, PutPayload::from(data), opts)
            .await?;

        Ok(())
    }

    async fn get(&self, key: &str) -> BlobResult<Bytes> {
        let path = self.key_to_path(key);

        let result = self.object_store.get(&path).await?;
        let bytes = result.bytes().await.map_err(|e| BlobError::NetworkError {
            source: anyhow::Error::from(e),
        })?;

        Ok(bytes)
    }

    async fn presign_download(
        &self,
        key: &str,
        options: &DownloadOptions,
        expires_in: Duration,
    ) -> BlobResult<String> {
        presign::validate_expiry(expires_in).map_err(|e| BlobError::PresignError { reason: e })?;

        let presigning_config =
            PresigningConfig::expires_in(expires_in).map_err(|e| BlobError::PresignError {
                reason: format!("Failed to create presigning config: {}", e),
            })?;

        let presigned = self
            .s3_client
            .get_object()
            .bucket(&self.bucket)
            .key(self.prefixed_key(key))
            .response_content_disposition(options.content_disposition())
            .set_response_content_type(options.content_type.clone())
            .presigned(presigning_config)
            .await
            .map_err(|e| BlobError::PresignError {
                reason: format!("Failed to generate presigned GET URL: {}", e),
            })?;

        Ok(presigned.uri().to_string())
    }
}
