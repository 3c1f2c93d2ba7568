//! HTTP server layer for Pixelpress.
//!
//! This module provides the HTTP API for the image transformation pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │       POST /{rotate,crop,resize,flip,grayscale,changeformat}    │
//! │                                                                 │
//! │  ┌─────────────┐  ┌──────────────┐  ┌────────────────────────┐  │
//! │  │  handlers   │  │  rate_limit  │  │        routes          │  │
//! │  │ (requests)  │  │  (per-IP)    │  │  (router config)       │  │
//! │  └─────────────┘  └──────────────┘  └────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod rate_limit;
pub mod routes;

pub use handlers::{
    change_format_handler, crop_handler, flip_handler, grayscale_handler, health_handler,
    resize_handler, rotate_handler, AppState, ChangeFormatParams, CropParams, ErrorResponse,
    FlipParams, HealthResponse, ResizeParams, RotateParams,
};
pub use rate_limit::{rate_limit_middleware, RateLimiter};
pub use routes::{create_dev_router, create_router, RouterConfig};
