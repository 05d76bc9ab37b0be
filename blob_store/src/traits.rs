//! Core blob store trait.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::{presign::DownloadOptions, BlobResult};

/// Core blob store operations.
///
/// Objects are addressed by bare keys; each backend resolves keys against
/// the bucket/prefix or directory it was configured with.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store one object under `key` with the given content type.
    ///
    /// A second put to the same key overwrites the first.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> BlobResult<()>;

    /// Get entire blob data.
    ///
    /// Returns `BlobError::NotFound` if the blob doesn't exist.
    async fn get(&self, key: &str) -> BlobResult<Bytes>;

    /// Generate a time-limited download URL for `key`.
    ///
    /// The URL forces an attachment disposition per `options` and stays
    /// valid for `expires_in` regardless of any application-level expiry
    /// on the object it points at. For local files this is a `file://`
    /// URI (shared filesystem assumption).
    async fn presign_download(
        &self,
        key: &str,
        options: &DownloadOptions,
        expires_in: Duration,
    ) -> BlobResult<String>;
}
