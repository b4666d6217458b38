//! Conversion and service route groups.

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use std::sync::Arc;

/// The convert route enforces the request timeout itself so a late batch
/// still answers with its aggregate; it is kept out of the timeout layer.
pub fn convert_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        &format!("{}/convert", API_PREFIX),
        post(handlers::convert::convert_images),
    )
}

pub fn conversion_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/download-zip", API_PREFIX),
            post(handlers::archive::download_zip),
        )
        .route(
            &format!("{}/converted/{{filename}}", API_PREFIX),
            delete(handlers::converted::delete_converted),
        )
}

pub fn service_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/info", API_PREFIX),
            get(handlers::info::service_info),
        )
        .route(
            &format!("{}/openapi.json", API_PREFIX),
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}
