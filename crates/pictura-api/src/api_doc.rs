//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::setup::routes::health;
use pictura_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pictura API",
        version = "0.1.0",
        description = "Batch image to WebP conversion. Upload up to MAX_FILES images per request, download the results individually or as one ZIP archive. Converted files are ephemeral and expire on a timer."
    ),
    paths(
        handlers::convert::convert_images,
        handlers::archive::download_zip,
        handlers::converted::delete_converted,
        handlers::info::service_info,
        health::health_check,
    ),
    components(
        schemas(
            models::ConversionResult,
            models::ConversionFailure,
            models::FailureReason,
            models::BatchStats,
            handlers::convert::ConvertResponse,
            handlers::archive::DownloadZipRequest,
            handlers::archive::InlineFile,
            handlers::converted::DeleteResponse,
            handlers::info::InfoResponse,
            handlers::info::Capabilities,
            handlers::info::QualityRange,
            health::HealthCheckResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "conversion", description = "Image conversion, archive download and cleanup"),
        (name = "service", description = "Service information and health"),
    )
)]
pub struct ApiDoc;
