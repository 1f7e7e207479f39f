//! DID Admin Gateway - HTTP API
//!
//! This is the main entry point for the gateway service. Configuration is
//! read from the environment:
//!
//! - `LISTEN_ADDR` (default `0.0.0.0:8080`)
//! - `CORS_ORIGINS`, comma separated (default `*`)
//! - `STORAGE_BACKEND`, `memory` (default) or `rocksdb`
//! - `DATA_DIR`, required for `rocksdb`

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use did_admin_gateway::{create_router, GatewayConfig, GatewayState, StorageBackend};
use did_admin_inventory::{Inventory, InventoryService};
use did_admin_store::{BlobStore, Entity, MemoryBlobStore, RocksBlobStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,did_admin=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting DID Admin Gateway");

    let config = GatewayConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        e
    })?;

    tracing::info!(
        listen_addr = %config.listen_addr,
        backend = ?config.storage.backend,
        data_dir = ?config.storage.data_dir,
        "Gateway configuration loaded"
    );

    let blobs: Arc<dyn BlobStore> = match (config.storage.backend, &config.storage.data_dir) {
        (StorageBackend::RocksDb, Some(dir)) => {
            tracing::info!(path = %dir.display(), "Opening RocksDB store");
            Arc::new(RocksBlobStore::open(dir)?)
        }
        _ => {
            tracing::warn!("Using in-memory storage; records are lost on restart");
            Arc::new(MemoryBlobStore::new())
        }
    };

    let inventory = Arc::new(InventoryService::with_defaults(blobs));
    spawn_change_logger(&inventory);

    let listen_addr = config.listen_addr.clone();
    let app = create_router(GatewayState::new(inventory, config));
    tracing::info!("Router configured with all API endpoints");

    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Log every store change at debug level.
fn spawn_change_logger(inventory: &Arc<InventoryService>) {
    for entity in [Entity::Did, Entity::AreaCode, Entity::Company, Entity::DialB] {
        let mut changes = inventory.subscribe(entity);
        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(event) => tracing::debug!(entity = %event.entity, kind = ?event.kind, "Records changed"),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(entity = %entity, missed, "Change log lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
}
