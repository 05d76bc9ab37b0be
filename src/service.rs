use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum_server::Handle;
use blob_store::BlobStore;
use share_store::ShareStore;
use tokio::signal;
use tracing::info;

use crate::{
    config::ServerConfig,
    routes::{create_routes, RouteState},
};

pub struct Service {
    pub config: Arc<ServerConfig>,
    pub blob_storage: Arc<dyn BlobStore>,
    pub share_store: Arc<dyn ShareStore>,
}

impl Service {
    pub async fn new(config: ServerConfig) -> Result<Self> {
        config.validate()?;
        let blob_storage = blob_store::from_config(&config.blob_storage)
            .await
            .context("error initializing blob storage")?;
        let share_store = share_store::from_config(&config.share_store)
            .await
            .context("error initializing share store")?;
        Ok(Self {
            config: Arc::new(config),
            blob_storage,
            share_store,
        })
    }

    pub async fn start(&self) -> Result<()> {
        let route_state = RouteState {
            config: self.config.clone(),
            blob_storage: self.blob_storage.clone(),
            share_store: self.share_store.clone(),
        };

        let handle = Handle::new();
        let handle_sh = handle.clone();
        tokio::spawn(async move {
            shutdown_signal(handle_sh).await;
            info!("graceful shutdown signal received, shutting down server gracefully");
        });

        let addr: SocketAddr = self.config.listen_addr.parse()?;
        info!("server api listening on {}", self.config.listen_addr);
        let routes = create_routes(route_state);
        axum_server::bind(addr)
            .handle(handle)
            .serve(routes.into_make_service())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
        },
        _ = terminate => {
        },
    }
    handle.shutdown();
    info!("signal received, shutting down server gracefully");
}
