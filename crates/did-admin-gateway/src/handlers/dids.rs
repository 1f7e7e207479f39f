//! DID endpoints.
//!
//! CRUD, bulk operations, column values for filter menus and the three CSV
//! exports.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use did_admin_inventory::{CreateDidRequest, Inventory};
use did_admin_store::DidPatch;

use super::{csv_attachment, ApiResponse, BulkResult, IdList, ListParams};
use crate::error::ApiError;
use crate::state::GatewayState;

type AppState<I> = State<Arc<GatewayState<I>>>;

/// Body for a bulk update.
#[derive(Debug, Deserialize)]
pub struct BulkUpdateBody {
    /// DIDs to update.
    pub ids: Vec<String>,
    /// Fields to set on each.
    pub patch: DidPatch,
}

/// List DIDs with search, filters and sort.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` for malformed filters.
pub async fn list_dids<I>(
    State(state): AppState<I>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let query = params.into_query()?;
    let dids = state.inventory.list_dids(&query).await?;
    Ok(ApiResponse::list(dids))
}

/// Create a DID.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` if the number is missing.
pub async fn create_did<I>(
    State(state): AppState<I>,
    Json(body): Json<CreateDidRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let did = state.inventory.create_did(body).await?;
    Ok(ApiResponse::created(did).with_message("DID created successfully"))
}

/// Get one DID.
///
/// # Errors
///
/// Returns `ApiError::NotFound` if the DID doesn't exist.
pub async fn get_did<I>(
    State(state): AppState<I>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let did = state.inventory.get_did(&id).await?;
    Ok(ApiResponse::ok(did))
}

/// Update a DID. Serves both `PUT` and `PATCH`; fields left out are kept.
///
/// # Errors
///
/// Returns `ApiError::NotFound` if the DID doesn't exist.
pub async fn update_did<I>(
    State(state): AppState<I>,
    Path(id): Path<String>,
    Json(patch): Json<DidPatch>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let did = state.inventory.update_did(&id, patch).await?;
    Ok(ApiResponse::ok(did).with_message("DID updated successfully"))
}

/// Delete a DID.
///
/// # Errors
///
/// Returns `ApiError::NotFound` if the DID doesn't exist.
pub async fn delete_did<I>(
    State(state): AppState<I>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    state.inventory.delete_did(&id).await?;
    Ok(ApiResponse::message("DID deleted successfully"))
}

/// Delete several DIDs.
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
    let count = state.inventory.delete_dids(&body.ids).await?;
    Ok(ApiResponse::ok(BulkResult { count }).with_message(format!("Deleted {count} DIDs")))
}

/// Apply one patch to several DIDs.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` if the patch changes the number.
pub async fn bulk_update<I>(
    State(state): AppState<I>,
    Json(body): Json<BulkUpdateBody>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let count = state.inventory.update_dids(&body.ids, body.patch).await?;
    Ok(ApiResponse::ok(BulkResult { count }).with_message(format!("Updated {count} DIDs")))
}

/// Distinct values of one column.
///
/// # Errors
///
/// Returns an error if the inventory operation fails.
pub async fn column_values<I>(
    State(state): AppState<I>,
    Path(column): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let values = state.inventory.did_column_values(&column).await?;
    Ok(ApiResponse::list(values))
}

/// Grouped export of the DIDs matching the listing parameters.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` for malformed filters.
pub async fn export_all<I>(
    State(state): AppState<I>,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError>
where
    I: Inventory + 'static,
{
    let body = state.inventory.export_all_dids(&params.into_query()?).await?;
    Ok(csv_attachment("dids_export.csv", body))
}

/// Numbers-only export of the DIDs matching the listing parameters.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` for malformed filters.
pub async fn export_numbers<I>(
    State(state): AppState<I>,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError>
where
    I: Inventory + 'static,
{
    let body = state
        .inventory
        .export_did_numbers(&params.into_query()?)
        .await?;
    Ok(csv_attachment("did_numbers.csv", body))
}

/// Grouped export of the listed DIDs that match the listing parameters.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` if no ids are given.
pub async fn export_selected<I>(
    State(state): AppState<I>,
    Query(params): Query<ListParams>,
    Json(body): Json<IdList>,
) -> Result<Response, ApiError>
where
    I: Inventory + 'static,
{
    if body.ids.is_empty() {
        return Err(ApiError::BadRequest("no DIDs selected".to_string()));
    }
    let query = params.into_query()?;
    let body = state.inventory.export_selected_dids(&query, &body.ids).await?;
    Ok(csv_attachment("selected_dids.csv", body))
}
