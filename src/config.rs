use std::{net::SocketAddr, path::Path};

use anyhow::Result;
use blob_store::BlobStorageConfig;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use share_store::ShareStoreConfig;

/// Single files at or below this size are stored verbatim; anything
/// larger (or any multi-file upload) is zipped first.
pub const DEFAULT_MAX_SINGLE_FILE_SIZE_BYTES: u64 = 25 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub blob_storage: BlobStorageConfig,
    pub share_store: ShareStoreConfig,
    pub max_single_file_size_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: "0.0.0.0:8900".to_string(),
            blob_storage: Default::default(),
            share_store: Default::default(),
            max_single_file_size_bytes: DEFAULT_MAX_SINGLE_FILE_SIZE_BYTES,
        }
    }
}

impl ServerConfig {
    /// Defaults, overlaid with the YAML file (when given), overlaid with
    /// `RETROSHARE_`-prefixed environment variables
    /// (`RETROSHARE_BLOB_STORAGE__PATH`, `RETROSHARE_SHARE_STORE__TABLE_NAME`, ...).
    pub fn load(path: Option<&Path>) -> Result<ServerConfig> {
        let mut figment = Figment::from(Serialized::defaults(ServerConfig::default()));
        if let Some(path) = path {
            let config_str = std::fs::read_to_string(path)?;
            figment = figment.merge(Yaml::string(&config_str));
        }
        let config: ServerConfig = figment
            .merge(Env::prefixed("RETROSHARE_").split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Fail closed before any storage client is built.
    pub fn validate(&self) -> Result<()> {
        if self.blob_storage.path.is_empty() {
            return Err(anyhow::anyhow!("blob storage path is not set"));
        }
        if !self.blob_storage.path.starts_with("s3://")
            && !self.blob_storage.path.starts_with("file://")
        {
            return Err(anyhow::anyhow!(
                "blob storage path must be an s3:// or file:// URI: {}",
                self.blob_storage.path
            ));
        }
        if self.share_store.table_name.is_empty() {
            return Err(anyhow::anyhow!("share store table name is not set"));
        }
        if self.max_single_file_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "max_single_file_size_bytes must be greater than zero"
            ));
        }
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            return Err(anyhow::anyhow!(
                "invalid listen address: {}",
                self.listen_addr
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_missing_bucket_fails_closed() {
        let mut config = ServerConfig::default();
        config.blob_storage.path = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_table_fails_closed() {
        let mut config = ServerConfig::default();
        config.share_store.table_name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_storage_scheme() {
        let mut config = ServerConfig::default();
        config.blob_storage.path = "ftp://bucket".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_listen_addr() {
        let mut config = ServerConfig::default();
        config.listen_addr = "not-an-addr".to_string();
        assert!(config.validate().is_err());
    }
}
