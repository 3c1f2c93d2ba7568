//! HTTP request handlers: the request adapter in front of the pipeline.
//!
//! Each operation is a POST endpoint accepting a multipart form with two
//! fields:
//!
//! - `image` - the uploaded file; the declared content type must be
//!   `image/jpeg` or `image/png` and the filename extension one of
//!   `png`/`jpeg`/`jpg`
//! - `metadata` - a JSON object carrying the operation parameters (absent
//!   for grayscale)
//!
//! The adapter owns all transport-level validation: multipart shape,
//! content-type and extension whitelists, parameter presence. Range checks
//! and everything downstream belong to the pipeline. On success the response
//! body is the encoded image with the output media type; failures map to the
//! error taxonomy (400 for invalid input and bounds violations, 408 for
//! deadline expiry, 500 with a generic message for everything else).

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::PipelineError;
use crate::media::{ImageBlob, ImageFormat};
use crate::pipeline::Pipeline;
use crate::transform::{FlipDirection, Operation};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state: the pipeline behind every handler.
#[derive(Clone)]
pub struct AppState {
    /// The deadline pipeline executing all operations.
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    /// Create application state around the given pipeline.
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Metadata for the rotate operation.
#[derive(Debug, Deserialize)]
pub struct RotateParams {
    /// Rotation angle in degrees (positive = counter-clockwise).
    pub angle: Option<i64>,
}

/// Metadata for the crop operation. All four bounds are required.
#[derive(Debug, Deserialize)]
pub struct CropParams {
    #[serde(rename = "minX")]
    pub min_x: Option<i64>,
    #[serde(rename = "minY")]
    pub min_y: Option<i64>,
    #[serde(rename = "maxX")]
    pub max_x: Option<i64>,
    #[serde(rename = "maxY")]
    pub max_y: Option<i64>,
}

/// Metadata for the resize operation. At least one dimension is required.
#[derive(Debug, Deserialize)]
pub struct ResizeParams {
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// Metadata for the flip operation.
#[derive(Debug, Deserialize)]
pub struct FlipParams {
    /// `horizontal` or `vertical`, case-insensitive.
    pub direction: Option<String>,
}

/// Metadata for the format conversion operation.
#[derive(Debug, Deserialize)]
pub struct ChangeFormatParams {
    /// Target format: `png`, `jpeg` or `jpg`, case-insensitive.
    #[serde(rename = "formatName")]
    pub format_name: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error kind identifier (e.g. "invalid_input", "timeout").
    pub error: String,

    /// Human-readable message.
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,

    /// Service version.
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert pipeline errors to HTTP responses.
///
/// Client errors (400/408) carry their own message; server errors (500) are
/// logged with full detail and surfaced with a generic body only.
impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            PipelineError::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.to_string()),

            PipelineError::BoundsExceeded { .. } => (StatusCode::BAD_REQUEST, self.to_string()),

            PipelineError::Timeout => (StatusCode::REQUEST_TIMEOUT, "Operation timed out.".to_string()),

            PipelineError::InvalidImage(_) | PipelineError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong.".to_string(),
            ),
        };

        if status.is_server_error() {
            error!(error_type = self.kind(), "server error: {}", self);
        } else {
            warn!(error_type = self.kind(), "client error: {}", self);
        }

        (status, Json(ErrorResponse::new(self.kind(), message))).into_response()
    }
}

// =============================================================================
// Multipart Parsing
// =============================================================================

/// The parsed multipart form: optional metadata JSON plus the image blob.
struct Upload {
    metadata: Option<String>,
    blob: ImageBlob,
}

/// Read the multipart form, enforcing the content-type and extension
/// whitelists. Unknown fields are ignored.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, PipelineError> {
    let mut metadata = None;
    let mut blob = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PipelineError::InvalidInput(format!("malformed multipart body: {}", e)))?
    {
        match field.name() {
            Some("metadata") => {
                let text = field.text().await.map_err(|e| {
                    PipelineError::InvalidInput(format!("unreadable metadata field: {}", e))
                })?;
                metadata = Some(text);
            }
            Some("image") => {
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_default();
                if ImageFormat::from_media_type(&content_type).is_none() {
                    return Err(PipelineError::InvalidInput(format!(
                        "unsupported file type: {}",
                        content_type
                    )));
                }

                let filename = field.file_name().unwrap_or_default().to_string();
                let extension = std::path::Path::new(&filename)
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or_default();
                let format = ImageFormat::from_extension(extension).ok_or_else(|| {
                    PipelineError::InvalidInput("expected a png or jpeg image".to_string())
                })?;

                let data = field.bytes().await.map_err(|e| {
                    PipelineError::InvalidInput(format!("unreadable image field: {}", e))
                })?;
                blob = Some(ImageBlob::new(data, format));
            }
            _ => {}
        }
    }

    let blob = blob
        .ok_or_else(|| PipelineError::InvalidInput("image file is required".to_string()))?;

    Ok(Upload { metadata, blob })
}

/// Parse the metadata JSON into the operation's parameter struct.
fn parse_metadata<T: DeserializeOwned>(
    metadata: Option<&str>,
    missing_message: &str,
) -> Result<T, PipelineError> {
    let raw =
        metadata.ok_or_else(|| PipelineError::InvalidInput(missing_message.to_string()))?;
    serde_json::from_str(raw)
        .map_err(|e| PipelineError::InvalidInput(format!("malformed metadata: {}", e)))
}

/// Run the pipeline and wrap the outcome in an HTTP response.
async fn run_operation(
    state: &AppState,
    blob: &ImageBlob,
    op: Operation,
) -> Result<Response, PipelineError> {
    let outcome = state.pipeline.run(blob, &op).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, outcome.media_type)
        .body(axum::body::Body::from(outcome.data))
        .map_err(|e| PipelineError::Internal(e.to_string()))
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /rotate` - rotate by `metadata.angle` degrees.
pub async fn rotate_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, PipelineError> {
    let upload = read_upload(multipart).await?;
    let params: RotateParams = parse_metadata(upload.metadata.as_deref(), "angle must be set")?;
    let angle = params
        .angle
        .ok_or_else(|| PipelineError::InvalidInput("angle must be set".to_string()))?;

    run_operation(&state, &upload.blob, Operation::Rotate { angle }).await
}

/// `POST /crop` - crop to `metadata.{minX,minY,maxX,maxY}`.
pub async fn crop_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, PipelineError> {
    let upload = read_upload(multipart).await?;
    let params: CropParams =
        parse_metadata(upload.metadata.as_deref(), "crop bounds must be set")?;

    let (min_x, min_y, max_x, max_y) = match (params.min_x, params.min_y, params.max_x, params.max_y)
    {
        (Some(a), Some(b), Some(c), Some(d)) => (a, b, c, d),
        _ => {
            return Err(PipelineError::InvalidInput(
                "all four crop bounds must be set".to_string(),
            ))
        }
    };

    run_operation(
        &state,
        &upload.blob,
        Operation::Crop {
            min_x,
            min_y,
            max_x,
            max_y,
        },
    )
    .await
}

/// `POST /resize` - resize to `metadata.{width,height}` (at least one).
pub async fn resize_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, PipelineError> {
    let upload = read_upload(multipart).await?;
    let params: ResizeParams =
        parse_metadata(upload.metadata.as_deref(), "width or height must be set")?;

    run_operation(
        &state,
        &upload.blob,
        Operation::Resize {
            width: params.width,
            height: params.height,
        },
    )
    .await
}

/// `POST /flip` - mirror along `metadata.direction`.
pub async fn flip_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, PipelineError> {
    let upload = read_upload(multipart).await?;
    let params: FlipParams =
        parse_metadata(upload.metadata.as_deref(), "direction must be set")?;
    let raw = params
        .direction
        .ok_or_else(|| PipelineError::InvalidInput("direction must be set".to_string()))?;
    let direction = FlipDirection::parse(&raw).ok_or_else(|| {
        PipelineError::InvalidInput(
            "direction must be either horizontal or vertical".to_string(),
        )
    })?;

    run_operation(&state, &upload.blob, Operation::Flip { direction }).await
}

/// `POST /grayscale` - luminance-preserving desaturation; no metadata.
pub async fn grayscale_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, PipelineError> {
    let upload = read_upload(multipart).await?;

    run_operation(&state, &upload.blob, Operation::Grayscale).await
}

/// `POST /changeformat` - re-encode as `metadata.formatName`.
pub async fn change_format_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, PipelineError> {
    let upload = read_upload(multipart).await?;
    let params: ChangeFormatParams =
        parse_metadata(upload.metadata.as_deref(), "format name must be set")?;
    let raw = params
        .format_name
        .ok_or_else(|| PipelineError::InvalidInput("format name must be set".to_string()))?;
    let target = ImageFormat::from_extension(&raw)
        .ok_or_else(|| PipelineError::InvalidInput(format!("invalid format name: {}", raw)))?;

    run_operation(&state, &upload.blob, Operation::ChangeFormat { target }).await
}

/// `GET /health` - liveness probe.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
