//! The deadline pipeline: decode, validate, transform, encode.
//!
//! Every operation the service exposes runs through [`Pipeline::run`], which
//! executes one full decode -> bounds check -> transform -> encode sequence
//! under a single wall-clock budget:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Pipeline::run()                        │
//! │  1. Start deadline budget    4. Re-check deadline            │
//! │  2. Raced decode             5. Transform (pure)             │
//! │  3. Bounds check             6. Re-check, encode, re-check   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The deadline is a hard SLA, not an early-exit optimization: a phase that
//! completes after expiry is reported as `Timeout` even though its result
//! exists, and an encode failure that coincides with an elapsed deadline is
//! also reported as `Timeout` (the deadline overrides the secondary
//! symptom). Exactly one outcome is produced per invocation.
//!
//! Decoded buffers, transform outputs and encode buffers are owned
//! exclusively by the invocation that created them; nothing is cached or
//! shared across operations, so the pipeline holds no locks. Concurrency
//! exists solely to implement the decode-vs-deadline race.

mod bounds;
mod decode;
mod encode;

use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, error};

use crate::error::PipelineError;
use crate::media::ImageBlob;
use crate::transform::{self, Operation};

pub use bounds::check_bounds;
pub use decode::decode_raced;
pub use encode::{encode, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY};

// =============================================================================
// Deadline Budget
// =============================================================================

/// A one-shot monotonic deadline shared by every phase of one operation.
///
/// Started at operation entry; not resettable and not extendable. Once it
/// expires, no phase may report success.
#[derive(Debug, Clone, Copy)]
pub struct DeadlineBudget {
    deadline: tokio::time::Instant,
}

impl DeadlineBudget {
    /// Start a budget expiring `timeout` from now.
    pub fn start(timeout: Duration) -> Self {
        Self {
            deadline: tokio::time::Instant::now() + timeout,
        }
    }

    /// Whether the budget has already elapsed.
    pub fn expired(&self) -> bool {
        tokio::time::Instant::now() >= self.deadline
    }

    /// The absolute expiry instant, for `sleep_until`.
    pub fn deadline(&self) -> tokio::time::Instant {
        self.deadline
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Resource limits injected into the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineLimits {
    /// Wall-clock budget for one full operation.
    pub deadline: Duration,

    /// Maximum decoded width/height in pixels.
    pub max_dimension: u32,

    /// JPEG quality for encoded output.
    pub jpeg_quality: u8,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(crate::config::DEFAULT_DEADLINE_SECS),
            max_dimension: crate::config::DEFAULT_MAX_DIMENSION,
            jpeg_quality: crate::config::DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Successful pipeline output: encoded bytes plus the response media type.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// The encoded image bytes.
    pub data: Bytes,

    /// Media type matching the output encoding.
    pub media_type: &'static str,
}

/// Orchestrates one full operation under a deadline budget.
///
/// Stateless apart from the injected limits; safe to share across concurrent
/// requests. Operations never affect one another.
#[derive(Debug, Clone)]
pub struct Pipeline {
    limits: PipelineLimits,
}

impl Pipeline {
    /// Create a pipeline with the given limits.
    pub fn new(limits: PipelineLimits) -> Self {
        Self { limits }
    }

    /// The limits this pipeline enforces.
    pub fn limits(&self) -> &PipelineLimits {
        &self.limits
    }

    /// Run one operation against one uploaded blob.
    ///
    /// Phases execute strictly in order; no phase starts before the prior
    /// phase's success is observed. The decode wait is the only suspension
    /// point.
    pub async fn run(
        &self,
        blob: &ImageBlob,
        op: &Operation,
    ) -> Result<EncodedImage, PipelineError> {
        let budget = DeadlineBudget::start(self.limits.deadline);

        // Parameter validation is free; fail before paying for a decode.
        op.validate(blob.format)?;

        let decoded = decode_raced(blob.data.clone(), &budget).await?;

        check_bounds(&decoded, self.limits.max_dimension)?;

        if budget.expired() {
            return Err(PipelineError::Timeout);
        }

        let transformed = transform::apply(decoded, op)?;

        if budget.expired() {
            return Err(PipelineError::Timeout);
        }

        let output_format = op.output_format(blob.format);
        let encoded = encode(&transformed, output_format, self.limits.jpeg_quality);
        let data = finish_encode(encoded, budget.expired(), op.name())?;

        debug!(
            operation = op.name(),
            output = output_format.name(),
            bytes = data.len(),
            "operation complete"
        );

        Ok(EncodedImage {
            data,
            media_type: output_format.media_type(),
        })
    }
}

/// Final classification of the encode outcome against the deadline.
///
/// The deadline overrides whatever encoding produced: a late success is not
/// a success, and a late failure is not an internal error. With time
/// remaining the encode result passes through unchanged.
fn finish_encode(
    encoded: Result<Bytes, PipelineError>,
    expired: bool,
    operation: &str,
) -> Result<Bytes, PipelineError> {
    if expired {
        if let Err(ref err) = encoded {
            error!(operation, "encode failed after deadline: {}", err);
        }
        return Err(PipelineError::Timeout);
    }
    encoded
}

// =============================================================================
// Tests
// =============================================================================
