//! Company endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use did_admin_inventory::{CreateCompanyRequest, Inventory};
use did_admin_store::CompanyPatch;

use super::{ApiResponse, BulkResult, ListParams};
use crate::error::ApiError;
use crate::state::GatewayState;

type AppState<I> = State<Arc<GatewayState<I>>>;

/// Body for a bulk replace.
#[derive(Debug, Deserialize)]
pub struct BulkCompanies {
    /// The new company list.
    pub companies: Vec<CreateCompanyRequest>,
}

/// List companies.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` for malformed filters.
pub async fn list_companies<I>(
    State(state): AppState<I>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let companies = state.inventory.list_companies(&params.into_query()?).await?;
    Ok(ApiResponse::list(companies))
}

/// Create a company.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` without a name and `ApiError::Conflict`
/// for a taken code.
pub async fn create_company<I>(
    State(state): AppState<I>,
    Json(body): Json<CreateCompanyRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let company = state.inventory.create_company(body).await?;
    Ok(ApiResponse::created(company).with_message("Company created successfully"))
}

/// Replace the whole company list.
///
/// # Errors
///
/// Returns `ApiError::Conflict` if a code repeats.
pub async fn bulk_replace<I>(
    State(state): AppState<I>,
    Json(body): Json<BulkCompanies>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let count = state.inventory.replace_companies(body.companies).await?;
    Ok(ApiResponse::created(BulkResult { count })
        .with_message(format!("Successfully imported {count} companies")))
}

/// Get one company.
///
/// # Errors
///
/// Returns `ApiError::NotFound` if it doesn't exist.
pub async fn get_company<I>(
    State(state): AppState<I>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    Ok(ApiResponse::ok(state.inventory.get_company(&id).await?))
}

/// Update a company. Serves both `PUT` and `PATCH`.
///
/// # Errors
///
/// Returns `ApiError::NotFound` or `ApiError::Conflict`.
pub async fn update_company<I>(
    State(state): AppState<I>,
    Path(id): Path<String>,
    Json(patch): Json<CompanyPatch>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    let company = state.inventory.update_company(&id, patch).await?;
    Ok(ApiResponse::ok(company).with_message("Company updated successfully"))
}

/// Delete a company.
///
/// # Errors
///
/// Returns `ApiError::NotFound` if it doesn't exist.
pub async fn delete_company<I>(
    State(state): AppState<I>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    I: Inventory + 'static,
{
    state.inventory.delete_company(&id).await?;
    Ok(ApiResponse::message("Company deleted successfully"))
}
