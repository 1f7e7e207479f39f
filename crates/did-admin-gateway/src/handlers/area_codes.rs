//! Area-code endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use did_admin_inventory::{CreateAreaCodeRequest, Inventory};
use did_admin_store::AreaCodePatch;

use super::{ApiResponse, BulkResult, ListParams};
use crate::error::ApiError;
use crate::state::GatewayState;

type AppState<I> = State<Arc<GatewayState<I>>>;

/// Body for a bulk replace.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAreaCodes {
    /// The new table.
    pub area_codes: Vec<CreateAreaCodeRequest>,
}

/// List area codes.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` for malformed filters.
pub async fn list_area_codes<I>(
    State(state): AppState<I>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let codes = state.inventory.list_area_codes(&params.into_query()?).await?;
    Ok(ApiResponse::list(codes))
}

/// Create an area code.
///
/// # Errors
///
/// Returns `ApiError::Conflict` if the code exists.
pub async fn create_area_code<I>(
    State(state): AppState<I>,
    Json(body): Json<CreateAreaCodeRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let code = state.inventory.create_area_code(body).await?;
    Ok(ApiResponse::created(code).with_message("Area code created successfully"))
}

/// Replace the whole table.
///
/// # Errors
///
/// Returns `ApiError::Conflict` if a code repeats.
pub async fn bulk_replace<I>(
    State(state): AppState<I>,
    Json(body): Json<BulkAreaCodes>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let count = state.inventory.replace_area_codes(body.area_codes).await?;
    Ok(ApiResponse::created(BulkResult { count })
        .with_message(format!("Successfully imported {count} area codes")))
}

/// Get one area code.
///
/// # Errors
///
/// Returns `ApiError::NotFound` if it doesn't exist.
pub async fn get_area_code<I>(
    State(state): AppState<I>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    Ok(ApiResponse::ok(state.inventory.get_area_code(&id).await?))
}

/// Update an area code. Serves both `PUT` and `PATCH`.
///
/// # Errors
///
/// Returns `ApiError::NotFound` or `ApiError::Conflict`.
pub async fn update_area_code<I>(
    State(state): AppState<I>,
    Path(id): Path<String>,
    Json(patch): Json<AreaCodePatch>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let code = state.inventory.update_area_code(&id, patch).await?;
    Ok(ApiResponse::ok(code).with_message("Area code updated successfully"))
}

/// Delete an area code.
///
/// # Errors
///
/// Returns `ApiError::NotFound` if it doesn't exist.
pub async fn delete_area_code<I>(
    State(state): AppState<I>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    state.inventory.delete_area_code(&id).await?;
    Ok(ApiResponse::message("Area code deleted successfully"))
}

/// DIDs using an area code. The path segment is the code, not a record id.
///
/// # Errors
///
/// Returns an error if the inventory operation fails.
pub async fn dids_for_code<I>(
    State(state): AppState<I>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    Ok(ApiResponse::list(state.inventory.dids_for_area_code(&code).await?))
}

/// Rewrite every DID's state from the table.
///
/// # Errors
///
/// Returns an error if the inventory operation fails.
pub async fn sync_states<I>(State(state): AppState<I>) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let count = state.inventory.sync_did_states().await?;
    Ok(ApiResponse::ok(BulkResult { count }).with_message(format!("Updated state on {count} DIDs")))
}

/// Recompute DID counts on every area code.
///
/// # Errors
///
/// Returns an error if the inventory operation fails.
pub async fn recompute_counts<I>(State(state): AppState<I>) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let count = state.inventory.recompute_area_code_counts().await?;
    Ok(ApiResponse::ok(BulkResult { count }))
}
