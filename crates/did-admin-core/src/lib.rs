//! Core types and utilities for did-admin.
//!
//! This crate provides the foundational pieces shared by every other crate:
//!
//! - **Identifiers**: the opaque [`RecordId`] used by all persisted records
//! - **Phone numbers**: canonicalization of raw DID strings, area-code
//!   extraction and the DialB match key
//!
//! # Example
//!
//! ```
//! use did_admin_core::{phone, RecordId};
//!
//! let id = RecordId::generate("did");
//! assert!(id.as_str().starts_with("did-"));
//!
//! assert_eq!(phone::normalize("tel:+1-212-555-0100"), "12125550100");
//! assert_eq!(phone::area_code("2125550100"), "212");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod phone;

pub use error::IdError;
pub use ids::RecordId;
