//! CSV import pipeline for did-admin.
//!
//! Uploaded spreadsheets are rarely clean: carrier exports carry report
//! titles, "data as of" lines and totals around the actual table. This
//! crate turns raw text into named rows in three steps:
//!
//! ```text
//! raw text ──► csv::parse_rows ──► header::sanitize ──► mapping::auto_map
//!              (quoted cells)      (find header row,    (header → DID field)
//!                                   drop footers)
//! ```
//!
//! It also writes CSV ([`csv::write_row`]) and serves the fixed upload
//! templates ([`template`]).
//!
//! # Example
//!
//! ```
//! use did_admin_import::{csv, header, mapping};
//!
//! let text = "Carrier Report\nPhone,Trunk,Forward\n2125550100,T1,3105550000\n";
//! let rows = csv::parse_rows(text);
//! let sheet = header::sanitize(&rows).unwrap();
//! let map = mapping::auto_map(&sheet.headers);
//!
//! assert_eq!(map.did_number.as_deref(), Some("Phone"));
//! assert_eq!(sheet.rows[0].get("Phone"), "2125550100");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod csv;
pub mod error;
pub mod header;
pub mod mapping;
pub mod template;

pub use error::{ImportError, Result};
pub use header::{CsvRow, SanitizedCsv};
pub use mapping::{ColumnMapping, TargetField};
pub use template::Template;
