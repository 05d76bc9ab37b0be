use anyhow::{anyhow, Result};
use bytes::Bytes;
use derive_builder::Builder;
use nanoid::nanoid;
use serde::{Deserialize, Serialize};

/// How long a share stays resolvable after upload.
pub const SHARE_LIFETIME_MS: u64 = 24 * 60 * 60 * 1000;

pub const SHARE_CODE_LEN: usize = 6;

pub const SHARE_CODE_ALPHABET: [char; 36] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Draw a fresh share code from the 36-symbol alphabet.
///
/// Codes are not checked against live records; a collision within the 24h
/// lifetime overwrites the older record.
pub fn generate_share_code() -> String {
    nanoid!(SHARE_CODE_LEN, &SHARE_CODE_ALPHABET)
}

/// One file received by the ingest endpoint, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type,
            data,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Metadata for one stored artifact, keyed by its share code.
///
/// Attribute names are camelCase on the wire and in the metadata store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Builder)]
#[builder(build_fn(skip))]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    pub share_code: String,
    pub s3_key: String,
    pub original_archive_name: String,
    pub expiration_time: u64,
    pub uploaded_at: u64,
    pub files_count: usize,
    pub file_names: Vec<String>,
    pub total_size_bytes: u64,
    pub is_compressed: bool,
    /// Epoch seconds for the store's own TTL reclamation. Derived from
    /// `expiration_time`; the resolve path never reads it.
    pub ttl: u64,
}

impl ShareRecord {
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expiration_time
    }
}

impl ShareRecordBuilder {
    pub fn build(&mut self) -> Result<ShareRecord> {
        let share_code = self
            .share_code
            .clone()
            .ok_or(anyhow!("share_code is required"))?;
        let s3_key = self.s3_key.clone().ok_or(anyhow!("s3_key is required"))?;
        let original_archive_name = self
            .original_archive_name
            .clone()
            .ok_or(anyhow!("original_archive_name is required"))?;
        let uploaded_at = self
            .uploaded_at
            .ok_or(anyhow!("uploaded_at is required"))?;
        let file_names = self
            .file_names
            .clone()
            .ok_or(anyhow!("file_names is required"))?;
        if file_names.is_empty() {
            return Err(anyhow!("file_names must not be empty"));
        }
        let total_size_bytes = self
            .total_size_bytes
            .ok_or(anyhow!("total_size_bytes is required"))?;
        let is_compressed = self.is_compressed.unwrap_or(false);

        let expiration_time = uploaded_at + SHARE_LIFETIME_MS;
        Ok(ShareRecord {
            share_code,
            s3_key,
            original_archive_name,
            expiration_time,
            uploaded_at,
            files_count: file_names.len(),
            file_names,
            total_size_bytes,
            is_compressed,
            ttl: expiration_time / 1000,
        })
    }
}
