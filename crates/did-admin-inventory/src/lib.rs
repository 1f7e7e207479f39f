//! DID inventory service.
//!
//! This crate holds the business logic of the DID admin application: DID,
//! area-code, company and DialB record management, CSV import with
//! duplicate detection, grouped exports and the filter/sort view layer the
//! tables are built on.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Gateway (HTTP)                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      InventoryService                        │
//! │  ┌───────────┐ ┌───────────┐ ┌───────────┐ ┌───────────┐   │
//! │  │  Import   │ │  Export   │ │   View    │ │   DialB   │   │
//! │  │  + dedup  │ │  grouping │ │ filter/sort│ │  matching │   │
//! │  └───────────┘ └───────────┘ └───────────┘ └───────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┼──────────────┐
//!               ▼              ▼              ▼
//!        ┌──────────┐   ┌──────────┐   ┌──────────┐
//!        │  Import  │   │  Record  │   │  Phone   │
//!        │  (CSV)   │   │  stores  │   │  (core)  │
//!        └──────────┘   └──────────┘   └──────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use did_admin_inventory::{ImportRequest, Inventory, InventoryService};
//! use did_admin_store::RocksBlobStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let blobs = Arc::new(RocksBlobStore::open("/tmp/did-admin")?);
//! let inventory = InventoryService::with_defaults(blobs);
//!
//! let outcome = inventory
//!     .import_dids(ImportRequest {
//!         csv: "Phone,Trunk,Forward\n2125550100,T1,\n".into(),
//!         provider: "Bandwidth".into(),
//!         ..ImportRequest::default()
//!     })
//!     .await?;
//!
//! println!("imported {}, skipped {}", outcome.success_count, outcome.duplicate_count);
//! # Ok(())
//! # }
//! ```
//!
//! # Derived fields
//!
//! A DID's area code comes from its normalized number and its state from
//! the area-code table. Both are re-derived when the number changes, and
//! area-code edits rewrite the state of every DID using that code.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod area_codes;
pub mod dialb;
pub mod error;
pub mod export;
pub mod import;
pub mod service;
pub mod types;
pub mod view;

pub use error::{InventoryError, Result};
pub use service::{Inventory, InventoryService};
pub use types::{
    Carrier, CreateAreaCodeRequest, CreateCompanyRequest, CreateDialBRequest, CreateDidRequest,
    DialBImportOutcome, DialBMatch, DialBQuery, DialBStats, DidView, ImportOutcome,
    ImportPreview, ImportRequest, InventoryConfig,
};
pub use view::{ColumnFilters, SortDirection, SortSpec, Tabular, ViewQuery};
