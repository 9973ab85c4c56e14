//! HTTP request handlers for the images API.
//!
//! # Endpoints
//!
//! - `GET /api/images/{image_name}` - Serve a (transformed) image
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{FormatError, LibraryError, TransformError};
use crate::imaging::{clamp_quality, DEFAULT_JPEG_QUALITY};
use crate::library::ImageLibrary;
use crate::transform::TransformParams;

/// Default `Cache-Control` max-age in seconds.
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state passed to all handlers via Axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    /// The library serving image requests
    pub library: Arc<ImageLibrary>,

    /// Cache-Control max-age in seconds
    pub cache_max_age: u32,

    /// JPEG quality for rasters that carry no encoded bytes
    pub jpeg_quality: u8,
}

impl AppState {
    pub fn new(library: ImageLibrary) -> Self {
        Self {
            library: Arc::new(library),
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_cache_max_age(mut self, cache_max_age: u32) -> Self {
        self.cache_max_age = cache_max_age;
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = clamp_quality(quality);
        self
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters for image requests.
///
/// Every parameter is optional; an empty value is treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ImageQueryParams {
    /// Target size, `W` or `WxH`
    #[serde(default)]
    pub resolution: Option<String>,

    /// Colour name or six hex digits
    #[serde(default, rename = "backgroundColour")]
    pub background_colour: Option<String>,

    /// Text drawn in the top-left corner
    #[serde(default)]
    pub watermark: Option<String>,

    /// Output format name (png, jpeg, bmp, gif, tiff)
    #[serde(default, rename = "imageType")]
    pub image_type: Option<String>,
}

impl From<ImageQueryParams> for TransformParams {
    fn from(query: ImageQueryParams) -> Self {
        TransformParams {
            resolution: query.resolution,
            background_colour: query.background_colour,
            watermark: query.watermark,
            image_type: query.image_type,
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "invalid_colour")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

fn format_error_type(err: &FormatError) -> &'static str {
    match err {
        FormatError::Resolution { .. } => "invalid_resolution",
        FormatError::Colour { .. } => "invalid_colour",
        FormatError::ImageType { .. } => "invalid_image_type",
    }
}

/// Convert LibraryError to HTTP response.
///
/// Malformed parameters are reported as 400 even though the library wraps
/// them as pipeline failures. Internal causes are logged but not echoed.
impl IntoResponse for LibraryError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match (&self, self.format_error()) {
            (LibraryError::InvalidArgument(message), _) => {
                (StatusCode::BAD_REQUEST, "invalid_argument", message.clone())
            }
            (LibraryError::NotAvailable { image_name }, _) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Image '{}' is not available", image_name),
            ),
            (_, Some(format_err)) => (
                StatusCode::BAD_REQUEST,
                format_error_type(format_err),
                format_err.to_string(),
            ),
            (LibraryError::Pipeline { source }, None) => {
                error!(
                    error_type = "internal_error",
                    status = StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                    "Server error: {}",
                    source
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Failed to retrieve image".to_string(),
                )
            }
        };

        if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else if status.is_client_error() {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);

        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle image requests.
///
/// # Endpoint
///
/// `GET /api/images/{image_name}`
///
/// # Query Parameters
///
/// - `resolution`: `W` (square) or `WxH`
/// - `backgroundColour`: colour name or `rrggbb`
/// - `watermark`: text drawn in the top-left corner
/// - `imageType`: `png`, `jpeg`, `bmp`, `gif` or `tiff`
///
/// # Response
///
/// - `200 OK`: encoded image with the matching `Content-Type`
/// - `400 Bad Request`: blank name or malformed parameter
/// - `404 Not Found`: no such image in the library
/// - `500 Internal Server Error`: loading, transforming or caching failed
///
/// # Headers
///
/// - `Content-Type: image/png` (or the requested type)
/// - `Cache-Control: public, max-age={cache_max_age}`
///
/// The body is the raster's stored encoding when it has one, so a cached
/// image is served byte-for-byte. Otherwise it is encoded off the runtime.
pub async fn image_handler(
    State(state): State<AppState>,
    Path(image_name): Path<String>,
    Query(query): Query<ImageQueryParams>,
) -> Result<Response, LibraryError> {
    let params = TransformParams::from(query);
    let image = state.library.get_image(&image_name, &params).await?;

    let raster = image.into_raster().ok_or_else(|| {
        LibraryError::pipeline(TransformError::InvalidArgument(format!(
            "image '{image_name}' has no raster data"
        )))
    })?;
    let format = raster.format();

    let data = match raster.encoded() {
        Some(encoded) => encoded.clone(),
        None => {
            let quality = state.jpeg_quality;
            tokio::task::spawn_blocking(move || raster.format().encode(raster.pixels(), quality))
                .await
                .map_err(|e| LibraryError::pipeline(TransformError::Aborted(e.to_string())))?
                .map(Bytes::from)
                .map_err(|e| LibraryError::pipeline(TransformError::from(e)))?
        }
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.mime_type().to_string()),
            (
                header::CACHE_CONTROL,
                format!("public, max-age={}", state.cache_max_age),
            ),
        ],
        Body::from(data),
    )
        .into_response())
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
