//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use did_admin_inventory::Inventory;

use crate::handlers::{area_codes, companies, dialb, dids, health, upload};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// ## DIDs
/// - `GET /api/dids` - List (search, sort, direction, filters)
/// - `POST /api/dids` - Create
/// - `GET|PUT|PATCH|DELETE /api/dids/:id`
/// - `POST /api/dids/bulk-delete`, `POST /api/dids/bulk-update`
/// - `GET /api/dids/columns/:column` - Distinct values
/// - `GET /api/dids/export/all`, `GET /api/dids/export/numbers`
/// - `POST /api/dids/export/selected`
///
/// ## Area codes
/// - `GET|POST /api/areacodes`, `POST /api/areacodes/bulk`
/// - `GET|PUT|PATCH|DELETE /api/areacodes/:id`
/// - `GET /api/areacodes/:id/dids` - DIDs for a code (the segment is the code)
/// - `POST /api/areacodes/sync-states`, `POST /api/areacodes/recompute-counts`
///
/// ## Companies
/// - `GET|POST /api/companies`, `POST /api/companies/bulk`
/// - `GET|PUT|PATCH|DELETE /api/companies/:id`
///
/// ## DialB
/// - `GET|POST /api/dialb`, `POST /api/dialb/bulk-delete`
/// - `POST /api/dialb/import`, `GET /api/dialb/export`, `GET /api/dialb/stats`
/// - `GET /api/dialb/phone/:phone`
/// - `GET|PUT|PATCH|DELETE /api/dialb/:id`
///
/// ## Upload
/// - `POST /api/upload/preview`, `POST /api/upload/dids`
/// - `POST /api/upload/areacodes`
/// - `GET /api/upload/template/:type`, `GET /api/upload/template/:type/csv`
pub fn create_router<I>(state: GatewayState<I>) -> Router
where
    I: Inventory + 'static,
{
    // Extract config values before moving state
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    let state = Arc::new(state);

    Router::new()
        .route("/health", get(health::health))
        // DIDs
        .route(
            "/api/dids",
            get(dids::list_dids::<I>).post(dids::create_did::<I>),
        )
        .route("/api/dids/bulk-delete", post(dids::bulk_delete::<I>))
        .route("/api/dids/bulk-update", post(dids::bulk_update::<I>))
        .route("/api/dids/columns/:column", get(dids::column_values::<I>))
        .route("/api/dids/export/all", get(dids::export_all::<I>))
        .route("/api/dids/export/numbers", get(dids::export_numbers::<I>))
        .route("/api/dids/export/selected", post(dids::export_selected::<I>))
        .route(
            "/api/dids/:id",
            get(dids::get_did::<I>)
                .put(dids::update_did::<I>)
                .patch(dids::update_did::<I>)
                .delete(dids::delete_did::<I>),
        )
        // Area codes
        .route(
            "/api/areacodes",
            get(area_codes::list_area_codes::<I>).post(area_codes::create_area_code::<I>),
        )
        .route("/api/areacodes/bulk", post(area_codes::bulk_replace::<I>))
        .route(
            "/api/areacodes/sync-states",
            post(area_codes::sync_states::<I>),
        )
        .route(
            "/api/areacodes/recompute-counts",
            post(area_codes::recompute_counts::<I>),
        )
        .route(
            "/api/areacodes/:id",
            get(area_codes::get_area_code::<I>)
                .put(area_codes::update_area_code::<I>)
                .patch(area_codes::update_area_code::<I>)
                .delete(area_codes::delete_area_code::<I>),
        )
        .route("/api/areacodes/:id/dids", get(area_codes::dids_for_code::<I>))
        // Companies
        .route(
            "/api/companies",
            get(companies::list_companies::<I>).post(companies::create_company::<I>),
        )
        .route("/api/companies/bulk", post(companies::bulk_replace::<I>))
        .route(
            "/api/companies/:id",
            get(companies::get_company::<I>)
                .put(companies::update_company::<I>)
                .patch(companies::update_company::<I>)
                .delete(companies::delete_company::<I>),
        )
        // DialB
        .route(
            "/api/dialb",
            get(dialb::list_records::<I>).post(dialb::create_record::<I>),
        )
        .route("/api/dialb/bulk-delete", post(dialb::bulk_delete::<I>))
        .route("/api/dialb/import", post(dialb::import_records::<I>))
        .route("/api/dialb/export", get(dialb::export_records::<I>))
        .route("/api/dialb/stats", get(dialb::stats::<I>))
        .route("/api/dialb/phone/:phone", get(dialb::get_by_phone::<I>))
        .route(
            "/api/dialb/:id",
            get(dialb::get_record::<I>)
                .put(dialb::update_record::<I>)
                .patch(dialb::update_record::<I>)
                .delete(dialb::delete_record::<I>),
        )
        // Upload
        .route("/api/upload/preview", post(upload::preview::<I>))
        .route("/api/upload/dids", post(upload::import_dids::<I>))
        .route("/api/upload/areacodes", post(upload::import_area_codes::<I>))
        .route("/api/upload/template/:type", get(upload::get_template))
        .route(
            "/api/upload/template/:type/csv",
            get(upload::download_template),
        )
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .map_response(IntoResponse::into_response)
                .layer(RequestBodyLimitLayer::new(max_body_bytes))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_any_origin() {
        let _layer = build_cors_layer(&["*".to_string()]);
        let _layer = build_cors_layer(&[]);
    }

    #[test]
    fn cors_specific_origins() {
        let origins = vec![
            "http://localhost:3000".to_string(),
            "https://admin.example.com".to_string(),
        ];
        let _layer = build_cors_layer(&origins);
    }
}
