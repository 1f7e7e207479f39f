//! HTTP gateway for the DID admin inventory service.
//!
//! This crate exposes the inventory over a JSON API. Every response uses
//! one envelope, `{ success, data?, message?, error?, total? }`, and CSV
//! exports are served as file attachments.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Admin front end                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ HTTP/JSON
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    did-admin-gateway                         │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐   │
//! │  │   Router    │ │  Handlers   │ │  Envelope + Errors  │   │
//! │  │ + Middleware│ │ per entity  │ │                     │   │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                    ┌──────────────────┐
//!                    │ InventoryService │
//!                    └──────────────────┘
//!                              │
//!                     ┌────────┴────────┐
//!                     ▼                 ▼
//!               ┌──────────┐      ┌──────────┐
//!               │  Memory  │      │ RocksDB  │
//!               └──────────┘      └──────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use did_admin_gateway::{create_router, GatewayConfig, GatewayState};
//! use did_admin_inventory::InventoryService;
//! use did_admin_store::MemoryBlobStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let inventory = Arc::new(InventoryService::with_defaults(Arc::new(MemoryBlobStore::new())));
//! let state = GatewayState::new(inventory, GatewayConfig::default());
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{ConfigError, GatewayConfig, StorageBackend, StorageConfig};
pub use error::ApiError;
pub use handlers::ApiResponse;
pub use routes::create_router;
pub use state::GatewayState;
