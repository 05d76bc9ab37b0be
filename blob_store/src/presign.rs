//! Presigned download parameters.

use std::time::Duration;

/// Response-header overrides applied to a presigned download.
///
/// Every download is forced to an `attachment` disposition under
/// `file_name`; `content_type` optionally overrides the content type the
/// store recorded at put time.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub file_name: String,
    pub content_type: Option<String>,
}

impl DownloadOptions {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
        }
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }
}

/// Maximum presigned URL expiry (7 days for S3).
pub const MAX_PRESIGN_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Validate presigned URL expiry duration.
pub fn validate_expiry(expires_in: Duration) -> Result<(), String> {
    if expires_in > MAX_PRESIGN_EXPIRY {
        Err(format!(
            "Expiry duration {:?} exceeds maximum allowed {:?}",
            expires_in, MAX_PRESIGN_EXPIRY
        ))
    } else if expires_in.is_zero() {
        Err("Expiry duration must be greater than zero".to_string())
    } else {
        Ok(())
    }
}
