//! Header-row detection and data-row cleanup.
//!
//! Carrier spreadsheets often open with a title, a customer line or a
//! "data as of" stamp before the real table, and close with totals. The
//! sanitizer scans the first [`HEADER_SCAN_ROWS`] rows for the first one
//! that looks like a header:
//!
//! - at least [`MIN_HEADER_COLUMNS`] non-blank cells and cells in total
//! - at least one cell that is not a number
//! - a domain keyword in some cell, or a position at or past row 2
//! - not a one-cell title and no metadata marker in any cell
//!
//! Rows after the header are kept unless blank or footer-like, and are
//! keyed by header name through the header's column position.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{ImportError, Result};

/// How many leading rows are considered when looking for the header.
pub const HEADER_SCAN_ROWS: usize = 15;

/// Minimum number of named columns in a header row.
pub const MIN_HEADER_COLUMNS: usize = 3;

const HEADER_KEYWORDS: &[&str] = &[
    "did",
    "trunk",
    "trank",
    "phone",
    "number",
    "forward",
    "destination",
    "type",
    "primary",
    "secondary",
    "status",
    "active",
    "company",
    "client",
];

const METADATA_MARKERS: &[&str] = &["provider", "customer", "report", "data as of"];

const FOOTER_MARKERS: &[&str] = &["total", "summary", "count", "end of"];

/// A data row keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CsvRow(BTreeMap<String, String>);

impl CsvRow {
    /// The trimmed cell under `header`, or `""` if absent.
    #[must_use]
    pub fn get(&self, header: &str) -> &str {
        self.0.get(header).map_or("", String::as_str)
    }

    /// Whether every cell is empty.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.values().all(String::is_empty)
    }
}

impl FromIterator<(String, String)> for CsvRow {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The result of sanitizing a parsed CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanitizedCsv {
    /// Zero-based index of the detected header row among the parsed rows.
    pub header_row: usize,
    /// Non-blank header names in column order.
    pub headers: Vec<String>,
    /// Data rows keyed by header name.
    pub rows: Vec<CsvRow>,
}

/// Locate the header row and convert the rows below it.
///
/// # Errors
///
/// - [`ImportError::HeaderNotFound`] if no scanned row qualifies
/// - [`ImportError::EmptyDataset`] if no data rows survive filtering
pub fn sanitize(rows: &[Vec<String>]) -> Result<SanitizedCsv> {
    let header_row = find_header_row(rows).ok_or(ImportError::HeaderNotFound)?;

    let columns: Vec<(usize, String)> = rows[header_row]
        .iter()
        .enumerate()
        .map(|(i, h)| (i, h.trim().to_string()))
        .filter(|(_, h)| !h.is_empty())
        .collect();

    let data: Vec<CsvRow> = rows[header_row + 1..]
        .iter()
        .filter(|row| !is_blank(row) && !is_footer(row))
        .map(|row| {
            columns
                .iter()
                .map(|(i, header)| {
                    let value = row.get(*i).map_or("", |c| c.trim());
                    (header.clone(), value.to_string())
                })
                .collect::<CsvRow>()
        })
        .filter(|row| !row.is_blank())
        .collect();

    if data.is_empty() {
        return Err(ImportError::EmptyDataset);
    }

    tracing::debug!(
        header_row,
        columns = columns.len(),
        rows = data.len(),
        "CSV header detected"
    );

    Ok(SanitizedCsv {
        header_row,
        headers: columns.into_iter().map(|(_, h)| h).collect(),
        rows: data,
    })
}

fn find_header_row(rows: &[Vec<String>]) -> Option<usize> {
    rows.iter()
        .take(HEADER_SCAN_ROWS)
        .enumerate()
        .filter(|(_, row)| !is_blank(row))
        .find(|(i, row)| looks_like_header(*i, row))
        .map(|(i, _)| i)
}

fn looks_like_header(index: usize, row: &[String]) -> bool {
    let named = row.iter().filter(|c| !c.trim().is_empty()).count();
    let has_text = row.iter().any(|c| !is_numeric(c));
    let lowered: Vec<String> = row.iter().map(|c| c.to_lowercase()).collect();
    let has_keyword = lowered
        .iter()
        .any(|c| HEADER_KEYWORDS.iter().any(|k| c.contains(k)));
    let is_title = row.len() == 1
        || lowered
            .iter()
            .any(|c| METADATA_MARKERS.iter().any(|m| c.contains(m)));

    named >= MIN_HEADER_COLUMNS
        && row.len() >= MIN_HEADER_COLUMNS
        && has_text
        && (has_keyword || index >= 2)
        && !is_title
}

/// Blank cells count as numeric, like `Number("")` does.
fn is_numeric(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty() || trimmed.parse::<f64>().is_ok_and(|v| !v.is_nan())
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

fn is_footer(row: &[String]) -> bool {
    let first = row.first().map(|c| c.trim().to_lowercase()).unwrap_or_default();
    FOOTER_MARKERS.iter().any(|m| first.starts_with(m))
}
