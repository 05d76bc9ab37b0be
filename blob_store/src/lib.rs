//! Blob storage for uploaded artifacts.
//!
//! One [`BlobStore`] trait, two backends: S3 (object_store for data I/O,
//! aws-sdk-s3 for presigned download URLs) and local filesystem (used in
//! development and tests, where `file://` URIs stand in for presigned
//! URLs). [`from_config`] picks the backend from the configured URI
//! scheme.

use std::{env, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::info;

mod backends;
mod error;
mod presign;
mod traits;

pub use backends::{local::LocalBlobStore, s3::S3BlobStore};
pub use error::{BlobError, BlobResult};
pub use presign::{validate_expiry, DownloadOptions, MAX_PRESIGN_EXPIRY};
pub use traits::BlobStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobStorageConfig {
    /// Base location for stored objects: `s3://bucket[/prefix]` or
    /// `file:///dir`.
    pub path: String,
    /// AWS region, S3 only.
    pub region: Option<String>,
}

impl Default for BlobStorageConfig {
    fn default() -> Self {
        let blob_store_path = format!(
            "file://{}",
            env::current_dir()
                .unwrap()
                .join("retroshare_storage/blobs")
                .to_str()
                .unwrap()
        );
        info!("using blob store path: {}", blob_store_path);
        BlobStorageConfig {
            path: blob_store_path,
            region: None,
        }
    }
}

/// Build the blob store backend named by the config's URI scheme.
pub async fn from_config(config: &BlobStorageConfig) -> BlobResult<Arc<dyn BlobStore>> {
    if config.path.starts_with("s3://") {
        let store = S3BlobStore::new(&config.path, config.region.clone()).await?;
        Ok(Arc::new(store))
    } else if config.path.starts_with("file://") {
        let store = LocalBlobStore::from_uri(&config.path)?;
        Ok(Arc::new(store))
    } else {
        let scheme = config.path.split("://").next().unwrap_or("").to_string();
        Err(BlobError::UnsupportedBackend { scheme })
    }
}
