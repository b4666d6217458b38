use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use pictura_core::constants::{
    MAX_QUALITY, MIN_QUALITY, OUTPUT_FORMAT_TAG, SERVICE_NAME, SERVICE_TITLE,
    SUPPORTED_SOURCE_FORMATS,
};
use pictura_core::DeliveryMode;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct QualityRange {
    pub min: u8,
    pub max: u8,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// e.g. `"50MB"`
    pub max_file_size: String,
    pub max_files: usize,
    pub supported_formats: Vec<String>,
    pub output_format: String,
    pub quality_range: QualityRange,
    pub default_quality: u8,
    pub lossless_at_quality: u8,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub service: String,
    pub title: String,
    pub version: String,
    #[schema(value_type = String)]
    pub delivery_mode: DeliveryMode,
    pub capabilities: Capabilities,
}

#[utoipa::path(
    get,
    path = "/api/info",
    tag = "service",
    responses(
        (status = 200, description = "Service capabilities", body = InfoResponse)
    )
)]
pub async fn service_info(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    let config = &state.config;

    Json(InfoResponse {
        service: SERVICE_NAME.to_string(),
        title: SERVICE_TITLE.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        delivery_mode: state.delivery_mode(),
        capabilities: Capabilities {
            max_file_size: format!("{}MB", config.max_file_size_mb()),
            max_files: config.max_files(),
            supported_formats: SUPPORTED_SOURCE_FORMATS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            output_format: OUTPUT_FORMAT_TAG.to_uppercase(),
            quality_range: QualityRange {
                min: MIN_QUALITY,
                max: MAX_QUALITY,
            },
            default_quality: config.default_quality(),
            lossless_at_quality: MAX_QUALITY,
        },
    })
}
