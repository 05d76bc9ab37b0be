//! DynamoDB share store backend.

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::{config::Region, types::AttributeValue, Client as DynamoClient};
use data_model::ShareRecord;
use tracing::debug;

use crate::{ShareStore, ShareStoreConfig};

/// Share records in a DynamoDB table, keyed by `shareCode`.
///
/// The table is expected to have TTL enabled on the `ttl` attribute so
/// expired records get garbage-collected without application involvement.
pub struct DynamoShareStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoShareStore {
    pub async fn new(config: &ShareStoreConfig) -> Result<Self> {
        if config.table_name.is_empty() {
            return Err(anyhow!("share store table name is not set"));
        }

        let mut config_loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            config_loader = config_loader.region(Region::new(region.clone()));
        }
        let aws_config = config_loader.load().await;

        Ok(Self {
            client: DynamoClient::new(&aws_config),
            table_name: config.table_name.clone(),
        })
    }
}

#[async_trait]
impl ShareStore for DynamoShareStore {
    async fn put(&self, record: &ShareRecord) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(record)))
            .send()
            .await
            .with_context(|| format!("failed to store share record {}", record.share_code))?;
        debug!(share_code = %record.share_code, s3_key = %record.s3_key, "stored share record");
        Ok(())
    }

    async fn get(&self, share_code: &str) -> Result<Option<ShareRecord>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("shareCode", AttributeValue::S(share_code.to_string()))
            .send()
            .await
            .with_context(|| format!("failed to look up share code {}", share_code))?;

        match output.item {
            Some(item) => Ok(Some(from_item(&item)?)),
            None => Ok(None),
        }
    }
}

fn to_item(record: &ShareRecord) -> HashMap<String, AttributeValue> {
    let file_names = record
        .file_names
        .iter()
        .map(|name| AttributeValue::S(name.clone()))
        .collect();

    HashMap::from([
        (
            "shareCode".to_string(),
            AttributeValue::S(record.share_code.clone()),
        ),
        ("s3Key".to_string(), AttributeValue::S(record.s3_key.clone())),
        (
            "originalArchiveName".to_string(),
            AttributeValue::S(record.original_archive_name.clone()),
        ),
        (
            "expirationTime".to_string(),
            AttributeValue::N(record.expiration_time.to_string()),
        ),
        (
            "uploadedAt".to_string(),
            AttributeValue::N(record.uploaded_at.to_string()),
        ),
        (
            "filesCount".to_string(),
            AttributeValue::N(record.files_count.to_string()),
        ),
        ("fileNames".to_string(), AttributeValue::L(file_names)),
        (
            "totalSizeBytes".to_string(),
            AttributeValue::N(record.total_size_bytes.to_string()),
        ),
        (
            "isCompressed".to_string(),
            AttributeValue::Bool(record.is_compressed),
        ),
        ("ttl".to_string(), AttributeValue::N(record.ttl.to_string())),
    ])
}

fn from_item(item: &HashMap<String, AttributeValue>) -> Result<ShareRecord> {
    Ok(ShareRecord {
        share_code: get_s(item, "shareCode")?,
        s3_key: get_s(item, "s3Key")?,
        original_archive_name: get_s(item, "originalArchiveName")?,
        expiration_time: get_n(item, "expirationTime")?,
        uploaded_at: get_n(item, "uploadedAt")?,
        files_count: get_n(item, "filesCount")? as usize,
        file_names: get_string_list(item, "fileNames")?,
        total_size_bytes: get_n(item, "totalSizeBytes")?,
        is_compressed: get_bool(item, "isCompressed")?,
        ttl: get_n(item, "ttl")?,
    })
}

fn get_attr<'a>(item: &'a HashMap<String, AttributeValue>, name: &str) -> Result<&'a AttributeValue> {
    item.get(name)
        .ok_or_else(|| anyhow!("share record is missing attribute {}", name))
}

fn get_s(item: &HashMap<String, AttributeValue>, name: &str) -> Result<String> {
    Ok(get_attr(item, name)?
        .as_s()
        .map_err(|_| anyhow!("attribute {} is not a string", name))?
        .clone())
}

fn get_n(item: &HashMap<String, AttributeValue>, name: &str) -> Result<u64> {
    get_attr(item, name)?
        .as_n()
        .map_err(|_| anyhow!("attribute {} is not a number", name))?
        .parse::<u64>()
        .with_context(|| format!("attribute {} is not a valid u64", name))
}

fn get_bool(item: &HashMap<String, AttributeValue>, name: &str) -> Result<bool> {
    Ok(*get_attr(item, name)?
        .as_bool()
        .map_err(|_| anyhow!("attribute {} is not a bool", name))?)
}

fn get_string_list(item: &HashMap<String, AttributeValue>, name: &str) -> Result<Vec<String>> {
    get_attr(item, name)?
        .as_l()
        .map_err(|_| anyhow!("attribute {} is not a list", name))?
        .iter()
        .map(|v| {
            v.as_s()
                .map(|s| s.clone())
                .map_err(|_| anyhow!("attribute {} has a non-string member", name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use data_model::{generate_share_code, ShareRecordBuilder};

    use super::*;

    fn record() -> ShareRecord {
        ShareRecordBuilder::default()
            .share_code(generate_share_code())
            .s3_key("1700000000000-archive.zip".to_string())
            .original_archive_name("report_and_2_more_files.zip".to_string())
            .uploaded_at(1_700_000_000_000u64)
            .file_names(vec![
                "report.pdf".to_string(),
                "a.txt".to_string(),
                "b.txt".to_string(),
            ])
            .total_size_bytes(4096)
            .is_compressed(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_item_round_trip() {
        let rec = record();
        let restored = from_item(&to_item(&rec)).unwrap();
        assert_eq!(restored, rec);
    }

    #[test]
    fn test_ttl_attribute_is_epoch_seconds() {
        let rec = record();
        let item = to_item(&rec);
        let ttl = item.get("ttl").unwrap().as_n().unwrap();
        assert_eq!(ttl, &(rec.expiration_time / 1000).to_string());
    }

    #[test]
    fn test_missing_attribute_is_an_error() {
        let mut item = to_item(&record());
        item.remove("expirationTime");
        assert!(from_item(&item).is_err());
    }

    #[test]
    fn test_malformed_number_is_an_error() {
        let mut item = to_item(&record());
        item.insert(
            "uploadedAt".to_string(),
            AttributeValue::N("not-a-number".to_string()),
        );
        assert!(from_item(&item).is_err());
    }
}
