//! # Pixelpress
//!
//! An HTTP image transformation service.
//!
//! Clients upload a JPEG or PNG image together with operation parameters and
//! receive the transformed image back in the response body. Every request
//! runs through a bounded pipeline - decode, validate, transform, encode -
//! under a single wall-clock deadline, so a pathological upload can never
//! hold a connection open indefinitely.
//!
//! ## Features
//!
//! - **Six operations**: rotate (arbitrary angles), crop, resize, flip,
//!   grayscale, and png/jpeg format conversion
//! - **Deadline enforcement**: a per-request budget covers the entire
//!   pipeline; decoding races the deadline on a blocking worker
//! - **Resource ceilings**: decoded dimensions and upload size are capped
//!   before any transform work starts
//! - **Per-IP rate limiting**: a fixed-window counter with loopback exempt
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`media`] - image formats and uploaded blobs
//! - [`transform`] - operation variants, validation and pixel transforms
//! - [`pipeline`] - the deadline pipeline orchestrating one operation
//! - [`server`] - Axum-based HTTP server, routes and rate limiting
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use pixelpress::pipeline::{Pipeline, PipelineLimits};
//! use pixelpress::server::{create_router, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let pipeline = Pipeline::new(PipelineLimits::default());
//!     let router = create_router(pipeline, RouterConfig::new());
//!
//!     // Start the server...
//! }
//! ```

pub mod config;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod server;
pub mod transform;

// Re-export commonly used types
pub use config::Config;
pub use error::PipelineError;
pub use media::{ImageBlob, ImageFormat};
pub use pipeline::{
    check_bounds, decode_raced, encode, DeadlineBudget, EncodedImage, Pipeline, PipelineLimits,
    MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
pub use server::{
    create_dev_router, create_router, rate_limit_middleware, AppState, ErrorResponse,
    HealthResponse, RateLimiter, RouterConfig,
};
pub use transform::{apply, rotate, FlipDirection, Operation, MAX_RESIZE_DIMENSION};
