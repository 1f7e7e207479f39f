//! HTTP request handlers.
//!
//! This module contains all the endpoint handlers for the gateway API, plus
//! the response envelope and request shapes they share.

pub mod area_codes;
pub mod companies;
pub mod dialb;
pub mod dids;
pub mod health;
pub mod upload;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use did_admin_inventory::{ColumnFilters, SortDirection, SortSpec, ViewQuery};

use crate::error::ApiError;

// =============================================================================
// Envelope
// =============================================================================

/// Success envelope: `{ success, data?, message?, total? }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Always `true`; failures go through [`ApiError`].
    pub success: bool,
    /// Payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Item count for list payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T> ApiResponse<T> {
    /// A 200 response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            total: None,
            status: StatusCode::OK,
        }
    }

    /// A 201 response carrying the created record.
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }

    /// Attach a message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// A 200 response carrying a list and its length.
    pub fn list(items: Vec<T>) -> Self {
        let total = items.len();
        Self {
            total: Some(total),
            ..Self::ok(items)
        }
    }
}

impl ApiResponse<()> {
    /// A 200 response with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            total: None,
            status: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// A CSV file download.
pub fn csv_attachment(file_name: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

// =============================================================================
// Shared request shapes
// =============================================================================

/// Query string for table listings.
///
/// `filters` is a JSON object mapping column keys to allowed values, e.g.
/// `{"state":["New York"],"status":["active"]}`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Free-text search.
    #[serde(default)]
    pub search: Option<String>,
    /// Sort column.
    #[serde(default)]
    pub sort: Option<String>,
    /// Sort direction: `asc`, `desc` or `none`.
    #[serde(default)]
    pub direction: Option<SortDirection>,
    /// Column filters as JSON.
    #[serde(default)]
    pub filters: Option<String>,
}

impl ListParams {
    /// Convert into a view query.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` if `filters` is not valid JSON.
    pub fn into_query(self) -> Result<ViewQuery, ApiError> {
        let filters = match self.filters.as_deref().filter(|f| !f.trim().is_empty()) {
            Some(raw) => serde_json::from_str::<ColumnFilters>(raw)
                .map_err(|e| ApiError::BadRequest(format!("invalid filters: {e}")))?,
            None => ColumnFilters::default(),
        };
        let sort = self.sort.map(|column| {
            SortSpec::new(column, self.direction.unwrap_or(SortDirection::Ascending))
        });
        Ok(ViewQuery {
            search: self.search.filter(|s| !s.is_empty()),
            filters,
            sort,
        })
    }
}

/// Body naming a set of records.
#[derive(Debug, Deserialize)]
pub struct IdList {
    /// Record identifiers.
    pub ids: Vec<String>,
}

/// Result of a bulk operation.
#[derive(Debug, Serialize)]
pub struct BulkResult {
    /// Records affected.
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_build_a_view_query() {
        let params = ListParams {
            search: Some("acme".into()),
            sort: Some("didNumber".into()),
            direction: Some(SortDirection::Descending),
            filters: Some(r#"{"state":["New York"]}"#.into()),
        };
        let query = params.into_query().unwrap();
        assert_eq!(query.search.as_deref(), Some("acme"));
        assert_eq!(
            query.sort,
            Some(SortSpec::new("didNumber", SortDirection::Descending))
        );
        assert_eq!(
            query.filters,
            ColumnFilters::new().with("state", ["New York"])
        );
    }

    #[test]
    fn bad_filters_are_rejected() {
        let params = ListParams {
            filters: Some("{state".into()),
            ..ListParams::default()
        };
        assert!(matches!(params.into_query(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn envelope_omits_empty_fields() {
        let body = serde_json::to_value(ApiResponse::message("done")).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "message": "done" }));

        let body = serde_json::to_value(ApiResponse::list(vec![1, 2])).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "success": true, "data": [1, 2], "total": 2 })
        );
    }
}
