use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use blob_store::LocalBlobStore;
use share_store::InMemoryShareStore;
use tempfile::TempDir;

use crate::{
    config::ServerConfig,
    routes::{create_routes, RouteState},
};

/// The real router wired to a tempdir blob store and an in-memory share
/// store, so tests exercise the full request path offline.
pub struct TestApp {
    pub router: Router,
    pub share_store: Arc<InMemoryShareStore>,
    _blob_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        Self::with_single_file_limit(crate::config::DEFAULT_MAX_SINGLE_FILE_SIZE_BYTES)
    }

    pub fn with_single_file_limit(limit_bytes: u64) -> Result<Self> {
        let blob_dir = tempfile::tempdir()?;

        let mut config = ServerConfig::default();
        config.blob_storage.path = format!("file://{}", blob_dir.path().display());
        config.max_single_file_size_bytes = limit_bytes;
        config.validate()?;

        let share_store = Arc::new(InMemoryShareStore::new());
        let state = RouteState {
            config: Arc::new(config),
            blob_storage: Arc::new(LocalBlobStore::new(blob_dir.path())),
            share_store: share_store.clone(),
        };

        Ok(Self {
            router: create_routes(state),
            share_store,
            _blob_dir: blob_dir,
        })
    }
}
