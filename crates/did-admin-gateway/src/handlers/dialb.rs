//! DialB endpoints: spam/clean flags per phone number.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use did_admin_inventory::{CreateDialBRequest, DialBQuery, Inventory};
use did_admin_store::DialBPatch;

use super::{csv_attachment, ApiResponse, BulkResult, IdList};
use crate::error::ApiError;
use crate::state::GatewayState;

type AppState<I> = State<Arc<GatewayState<I>>>;

/// List records matching search, status, group and carrier filters.
///
/// # Errors
///
/// Returns an error if the inventory operation fails.
pub async fn list_records<I>(
    State(state): AppState<I>,
    Query(query): Query<DialBQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    Ok(ApiResponse::list(state.inventory.list_dialb(&query).await?))
}

/// Create a record.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` without a phone number.
pub async fn create_record<I>(
    State(state): AppState<I>,
    Json(body): Json<CreateDialBRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let record = state.inventory.create_dialb(body).await?;
    Ok(ApiResponse::created(record).with_message("DialB record created successfully"))
}

/// Get one record.
///
/// # Errors
///
/// Returns `ApiError::NotFound` if it doesn't exist.
pub async fn get_record<I>(
    State(state): AppState<I>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    Ok(ApiResponse::ok(state.inventory.get_dialb(&id).await?))
}

/// Find a record by exact phone number.
///
/// # Errors
///
/// Returns `ApiError::NotFound` if no record has that number.
pub async fn get_by_phone<I>(
    State(state): AppState<I>,
    Path(phone): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let record = state
        .inventory
        .find_dialb_by_phone(&phone)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("DialB record not found: {phone}")))?;
    Ok(ApiResponse::ok(record))
}

/// Update a record. Serves both `PUT` and `PATCH`.
///
/// # Errors
///
/// Returns `ApiError::NotFound` if it doesn't exist.
pub async fn update_record<I>(
    State(state): AppState<I>,
    Path(id): Path<String>,
    Json(patch): Json<DialBPatch>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let record = state.inventory.update_dialb(&id, patch).await?;
    Ok(ApiResponse::ok(record).with_message("DialB record updated successfully"))
}

/// Delete a record.
///
/// # Errors
///
/// Returns `ApiError::NotFound` if it doesn't exist.
pub async fn delete_record<I>(
    State(state): AppState<I>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    state.inventory.delete_dialb(&id).await?;
    Ok(ApiResponse::message("DialB record deleted successfully"))
}

/// Delete several records.
///
/// # Errors
///
/// Returns an error if the inventory operation fails.
pub async fn bulk_delete<I>(
    State(state): AppState<I>,
    Json(body): Json<IdList>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let count = state.inventory.delete_dialbs(&body.ids).await?;
    Ok(ApiResponse::ok(BulkResult { count })
        .with_message(format!("Deleted {count} DialB records")))
}

/// Import a DialB CSV sent as the raw request body.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` if the header doesn't match the template.
pub async fn import_records<I>(
    State(state): AppState<I>,
    body: String,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let outcome = state.inventory.import_dialb(&body).await?;
    let message = format!(
        "Imported {} records ({} new, {} updated)",
        outcome.imported, outcome.created, outcome.updated
    );
    Ok(ApiResponse::ok(outcome).with_message(message))
}

/// Export every record as CSV.
///
/// # Errors
///
/// Returns an error if the inventory operation fails.
pub async fn export_records<I>(State(state): AppState<I>) -> Result<Response, ApiError>
where
    I: Inventory + 'static,
{
    let body = state.inventory.export_dialb().await?;
    Ok(csv_attachment("dialb_export.csv", body))
}

/// Summary counts.
///
/// # Errors
///
/// Returns an error if the inventory operation fails.
pub async fn stats<I>(State(state): AppState<I>) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    Ok(ApiResponse::ok(state.inventory.dialb_stats().await?))
}
