//! Local filesystem blob store backend.

use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;

use crate::{presign::DownloadOptions, BlobError, BlobResult, BlobStore};

/// Local filesystem blob store rooted at one directory.
///
/// Stands in for S3 in development and tests. "Presigned" URLs are plain
/// `file://` URIs; the disposition and expiry options have no local
/// equivalent and are ignored.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Extract the root directory from a file:// URI.
    pub fn from_uri(uri: &str) -> BlobResult<Self> {
        let path = uri
            .strip_prefix("file://")
            .ok_or_else(|| BlobError::InvalidUri {
                uri: uri.to_string(),
                reason: "URI must start with file://".to_string(),
            })?;
        Ok(Self::new(path))
    }

    fn key_to_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> BlobResult<()> {
        let path = self.key_to_path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &data).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> BlobResult<Bytes> {
        let path = self.key_to_path(key);
        let data = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BlobError::NotFound {
                    key: key.to_string(),
                }
            } else {
                BlobError::IoError { source: e }
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn presign_download(
        &self,
        key: &str,
        _options: &DownloadOptions,
        _expires_in: Duration,
    ) -> BlobResult<String> {
        let path = self.key_to_path(key);
        if !tokio::fs::try_exists(&path).await? {
            return Err(BlobError::NotFound {
                key: key.to_string(),
            });
        }
        Ok(format!("file://{}", path.display()))
    }
}
