//! Upload endpoints: DID import, area-code import and templates.
//!
//! Files are sent as text, either inside a JSON [`ImportRequest`] or as the
//! raw body. Multipart handling is left to whatever fronts the gateway.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use did_admin_import::Template;
use did_admin_inventory::{ImportRequest, Inventory};

use super::{csv_attachment, ApiResponse, BulkResult};
use crate::error::ApiError;
use crate::state::GatewayState;

type AppState<I> = State<Arc<GatewayState<I>>>;

/// Template body: the header row and one sample row.
#[derive(Debug, Serialize)]
pub struct TemplateBody {
    /// Column headers.
    pub headers: &'static [&'static str],
    /// Example values.
    pub sample: &'static [&'static str],
}

fn template(kind: &str) -> Result<Template, ApiError> {
    kind.parse::<Template>()
        .map_err(|_| ApiError::NotFound("Template not found".to_string()))
}

/// Parse and map an upload without importing it.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` if the file can't be read.
pub async fn preview<I>(
    State(state): AppState<I>,
    Json(body): Json<ImportRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    Ok(ApiResponse::ok(state.inventory.preview_import(body).await?))
}

/// Import DIDs.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` for unreadable files, a missing provider
/// or an unmapped number column; nothing is written in those cases.
pub async fn import_dids<I>(
    State(state): AppState<I>,
    Json(body): Json<ImportRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let outcome = state.inventory.import_dids(body).await?;
    let message = format!(
        "Imported {} DIDs, skipped {} duplicates",
        outcome.success_count, outcome.duplicate_count
    );
    Ok(ApiResponse::ok(outcome).with_message(message))
}

/// Import an `Area Code,State` CSV sent as the raw body.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` if either column is missing.
pub async fn import_area_codes<I>(
    State(state): AppState<I>,
    body: String,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let count = state.inventory.import_area_codes(&body).await?;
    Ok(ApiResponse::ok(BulkResult { count })
        .with_message(format!("Imported {count} area codes")))
}

/// Template headers and sample row for `dids` or `areacodes`.
///
/// # Errors
///
/// Returns `ApiError::NotFound` for any other type.
pub async fn get_template(Path(kind): Path<String>) -> Result<impl IntoResponse, ApiError> {
    let template = template(&kind)?;
    let body = TemplateBody {
        headers: template.headers(),
        sample: template.sample(),
    };
    Ok(ApiResponse::ok(body).with_message(format!("{template} template retrieved successfully")))
}

/// The template as a downloadable CSV file.
///
/// # Errors
///
/// Returns `ApiError::NotFound` for an unknown type.
pub async fn download_template(Path(kind): Path<String>) -> Result<Response, ApiError> {
    let template = template(&kind)?;
    Ok(csv_attachment(template.file_name(), template.to_csv()))
}
