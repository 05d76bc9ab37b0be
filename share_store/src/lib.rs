//! Metadata store for share records.
//!
//! A [`ShareStore`] maps share codes to [`ShareRecord`]s. Production uses
//! DynamoDB with a record-level TTL attribute; tests use the in-memory
//! backend. Records are written once and never mutated; reclamation of
//! expired records is the store's own business (the resolve path keeps its
//! explicit expiry check either way).

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use data_model::ShareRecord;
use serde::{Deserialize, Serialize};

mod dynamo;
mod memory;

pub use dynamo::DynamoShareStore;
pub use memory::InMemoryShareStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareStoreConfig {
    /// DynamoDB table holding share records, keyed by `shareCode`.
    pub table_name: String,
    /// AWS region override.
    pub region: Option<String>,
}

impl Default for ShareStoreConfig {
    fn default() -> Self {
        ShareStoreConfig {
            table_name: "FileShareCodes".to_string(),
            region: None,
        }
    }
}

/// Key-value access to share records.
#[async_trait]
pub trait ShareStore: Send + Sync {
    /// Persist one record under its share code, overwriting any record
    /// already stored there.
    async fn put(&self, record: &ShareRecord) -> Result<()>;

    /// Look up a record by share code. `None` means never issued, or
    /// already reclaimed by the store's TTL sweep.
    async fn get(&self, share_code: &str) -> Result<Option<ShareRecord>>;
}

/// Build the DynamoDB-backed store from config.
pub async fn from_config(config: &ShareStoreConfig) -> Result<Arc<dyn ShareStore>> {
    let store = DynamoShareStore::new(config).await?;
    Ok(Arc::new(store))
}
