//! Router configuration for Pixelpress.
//!
//! This module defines the HTTP routes and applies middleware for upload size
//! limiting, per-IP rate limiting and CORS.
//!
//! # Route Structure
//!
//! ```text
//! /health         - Health check
//! /rotate         - Rotate by an angle in degrees
//! /crop           - Crop to a pixel rectangle
//! /resize         - Resize with optional aspect preservation
//! /flip           - Mirror horizontally or vertically
//! /grayscale      - Desaturate
//! /changeformat   - Convert between png and jpeg
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pixelpress::pipeline::{Pipeline, PipelineLimits};
//! use pixelpress::server::routes::{create_router, RouterConfig};
//!
//! let pipeline = Pipeline::new(PipelineLimits::default());
//!
//! let config = RouterConfig::new()
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(pipeline, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::{middleware, routing::get, routing::post, Router};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    change_format_handler, crop_handler, flip_handler, grayscale_handler, health_handler,
    resize_handler, rotate_handler, AppState,
};
use super::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::config;
use crate::pipeline::Pipeline;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,

    /// Per-IP rate limit: max requests per window (None = rate limiting off)
    pub rate_limit: Option<(u32, Duration)>,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a router configuration with the default limits.
    ///
    /// By default:
    /// - Uploads are capped at 30 MiB
    /// - Each IP gets 10 requests per 30 seconds
    /// - CORS allows any origin
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            max_upload_bytes: config::DEFAULT_MAX_UPLOAD_BYTES,
            rate_limit: Some((
                config::DEFAULT_RATE_LIMIT_MAX,
                Duration::from_secs(config::DEFAULT_RATE_LIMIT_WINDOW_SECS),
            )),
            cors_origins: None, // Allow any origin by default
            enable_tracing: true,
        }
    }

    /// Set the maximum accepted request body size.
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Set the per-IP rate limit.
    pub fn with_rate_limit(mut self, max: u32, window: Duration) -> Self {
        self.rate_limit = Some((max, window));
        self
    }

    /// Disable rate limiting entirely.
    ///
    /// **Warning**: This should only be used for development/testing.
    pub fn without_rate_limit(mut self) -> Self {
        self.rate_limit = None;
        self
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    /// Pass None (or don't call this method) to allow any origin.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// This function builds the complete Axum router with:
/// - The six operation routes plus the health check
/// - A request body size cap
/// - Per-IP rate limiting (optional)
/// - CORS configuration
/// - Request tracing (optional)
pub fn create_router(pipeline: Pipeline, config: RouterConfig) -> Router {
    let app_state = AppState::new(pipeline);

    let cors = build_cors_layer(&config);

    let mut router = Router::new()
        .route("/rotate", post(rotate_handler))
        .route("/crop", post(crop_handler))
        .route("/resize", post(resize_handler))
        .route("/flip", post(flip_handler))
        .route("/grayscale", post(grayscale_handler))
        .route("/changeformat", post(change_format_handler))
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes));

    // Rate limiting covers the operation routes but not /health.
    if let Some((max, window)) = config.rate_limit {
        let limiter = Arc::new(RateLimiter::new(max, window));
        router = router.layer(middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        ));
    }

    let router = router
        .route("/health", get(health_handler))
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => {
            // No origins allowed - this effectively disables CORS
            cors
        }
        Some(origins) => {
            // Parse origins into HeaderValues
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Create a development router with rate limiting disabled.
///
/// **Warning**: This should only be used for local development and testing.
pub fn create_dev_router(pipeline: Pipeline) -> Router {
    create_router(pipeline, RouterConfig::new().without_rate_limit())
}

// =============================================================================
// Tests
// =============================================================================
