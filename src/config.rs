//! Configuration management for pixelpress.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `PIXELPRESS_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Environment Variables
//!
//! All configuration options can be set via environment variables with the
//! `PIXELPRESS_` prefix:
//!
//! - `PIXELPRESS_HOST` - Server bind address (default: 0.0.0.0)
//! - `PIXELPRESS_PORT` - Server port (default: 8000)
//! - `PIXELPRESS_DEADLINE_SECS` - Per-operation deadline (default: 30)
//! - `PIXELPRESS_MAX_DIMENSION` - Pixel bounds ceiling (default: 2000)
//! - `PIXELPRESS_MAX_UPLOAD_BYTES` - Upload size ceiling (default: 30 MiB)
//! - `PIXELPRESS_JPEG_QUALITY` - JPEG output quality (default: 85)
//! - `PIXELPRESS_RATE_LIMIT_MAX` - Requests per window per IP (default: 10)
//! - `PIXELPRESS_RATE_LIMIT_WINDOW_SECS` - Rate limit window (default: 30)

use std::time::Duration;

use clap::Parser;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default per-operation deadline in seconds.
pub const DEFAULT_DEADLINE_SECS: u64 = 30;

/// Default maximum decoded width/height in pixels.
pub const DEFAULT_MAX_DIMENSION: u32 = 2000;

/// Default maximum upload size in bytes (30 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 30 * 1024 * 1024;

/// Default JPEG output quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Default number of requests allowed per rate limit window per client IP.
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 10;

/// Default rate limit window in seconds.
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 30;

// =============================================================================
// CLI Arguments
// =============================================================================

/// pixelpress - an HTTP image transformation service.
///
/// Accepts PNG/JPEG uploads and applies a single transformation per request
/// (rotate, crop, resize, flip, grayscale, format conversion), each executed
/// under a hard wall-clock deadline with strict resource ceilings.
#[derive(Parser, Debug, Clone)]
#[command(name = "pixelpress")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "PIXELPRESS_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PIXELPRESS_PORT")]
    pub port: u16,

    // =========================================================================
    // Pipeline Limits
    // =========================================================================
    /// Wall-clock deadline for one operation, in seconds.
    ///
    /// The budget is shared by the decode, transform and encode phases; once
    /// it expires no phase may report success.
    #[arg(long, default_value_t = DEFAULT_DEADLINE_SECS, env = "PIXELPRESS_DEADLINE_SECS")]
    pub deadline_secs: u64,

    /// Maximum decoded image width/height in pixels.
    ///
    /// Caps the memory and CPU cost of the transforms independently of the
    /// upload size ceiling, which only bounds the encoded byte count.
    #[arg(long, default_value_t = DEFAULT_MAX_DIMENSION, env = "PIXELPRESS_MAX_DIMENSION")]
    pub max_dimension: u32,

    /// Maximum upload size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "PIXELPRESS_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: usize,

    /// JPEG quality for encoded output (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "PIXELPRESS_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    // =========================================================================
    // Rate Limiting Configuration
    // =========================================================================
    /// Maximum requests per rate limit window per client IP.
    #[arg(long, default_value_t = DEFAULT_RATE_LIMIT_MAX, env = "PIXELPRESS_RATE_LIMIT_MAX")]
    pub rate_limit_max: u32,

    /// Rate limit window in seconds.
    #[arg(
        long,
        default_value_t = DEFAULT_RATE_LIMIT_WINDOW_SECS,
        env = "PIXELPRESS_RATE_LIMIT_WINDOW_SECS"
    )]
    pub rate_limit_window_secs: u64,

    /// Disable per-IP rate limiting.
    #[arg(long, default_value_t = false, env = "PIXELPRESS_NO_RATE_LIMIT")]
    pub no_rate_limit: bool,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "PIXELPRESS_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.deadline_secs == 0 {
            return Err("deadline_secs must be greater than 0".to_string());
        }

        if self.max_dimension == 0 {
            return Err("max_dimension must be greater than 0".to_string());
        }

        if self.max_upload_bytes == 0 {
            return Err("max_upload_bytes must be greater than 0".to_string());
        }

        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err("jpeg_quality must be between 1 and 100".to_string());
        }

        if !self.no_rate_limit {
            if self.rate_limit_max == 0 {
                return Err(
                    "rate_limit_max must be greater than 0 (or pass --no-rate-limit)".to_string(),
                );
            }
            if self.rate_limit_window_secs == 0 {
                return Err("rate_limit_window_secs must be greater than 0".to_string());
            }
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The per-operation deadline as a [`Duration`].
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    /// The rate limit window as a [`Duration`].
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

// =============================================================================
// Tests
// =============================================================================
