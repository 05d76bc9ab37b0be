//! In-memory share store, for tests and local development.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use data_model::ShareRecord;
use tokio::sync::RwLock;

use crate::ShareStore;

#[derive(Default)]
pub struct InMemoryShareStore {
    records: RwLock<HashMap<String, ShareRecord>>,
}

impl InMemoryShareStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShareStore for InMemoryShareStore {
    async fn put(&self, record: &ShareRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.share_code.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, share_code: &str) -> Result<Option<ShareRecord>> {
        Ok(self.records.read().await.get(share_code).cloned())
    }
}

#[cfg(test)]
mod tests {
    use data_model::{generate_share_code, ShareRecordBuilder};

    use super::*;

    fn record(code: &str) -> ShareRecord {
        ShareRecordBuilder::default()
            .share_code(code.to_string())
            .s3_key("1-a.txt".to_string())
            .original_archive_name("a.txt".to_string())
            .uploaded_at(1u64)
            .file_names(vec!["a.txt".to_string()])
            .total_size_bytes(10)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_code() {
        let store = InMemoryShareStore::new();
        assert!(store.get("ZZZZZZ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let store = InMemoryShareStore::new();
        let code = generate_share_code();
        let rec = record(&code);
        store.put(&rec).await.unwrap();
        assert_eq!(store.get(&code).await.unwrap(), Some(rec));
    }

    #[tokio::test]
    async fn test_colliding_code_overwrites() {
        let store = InMemoryShareStore::new();
        let mut rec = record("AAAAAA");
        store.put(&rec).await.unwrap();
        rec.s3_key = "2-b.txt".to_string();
        store.put(&rec).await.unwrap();
        let stored = store.get("AAAAAA").await.unwrap().unwrap();
        assert_eq!(stored.s3_key, "2-b.txt");
    }
}
