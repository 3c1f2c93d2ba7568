use thiserror::Error;

/// Errors produced by the transformation pipeline.
///
/// This is the single error taxonomy for the whole service. Every phase of
/// the pipeline returns one of these kinds rather than escalating through
/// panics; the pipeline is the one place that decides the final
/// classification (including the rule that an elapsed deadline overrides a
/// secondary encode failure).
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// Malformed or out-of-range caller-supplied parameters (missing fields,
    /// bad ranges, invalid enum values, unsupported extension or target
    /// format). Always locally detected, surfaced as a client error.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The uploaded bytes could not be decoded as a supported raster format.
    #[error("could not decode image: {0}")]
    InvalidImage(String),

    /// Decoded pixel dimensions exceed the safety ceiling. This bounds the
    /// memory and CPU cost of the transforms regardless of the encoded file
    /// size, which only limits the compressed byte count.
    #[error("image dimensions {width}x{height} exceed the {limit}px ceiling")]
    BoundsExceeded { width: u32, height: u32, limit: u32 },

    /// The operation did not complete within its deadline budget, regardless
    /// of which phase was in flight when the deadline fired.
    #[error("operation deadline exceeded")]
    Timeout,

    /// Unexpected encode failure or any condition not attributable to caller
    /// input. Logged server-side with full detail; callers only ever see a
    /// generic message.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Short machine-readable identifier for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput(_) => "invalid_input",
            PipelineError::InvalidImage(_) => "invalid_image",
            PipelineError::BoundsExceeded { .. } => "bounds_exceeded",
            PipelineError::Timeout => "timeout",
            PipelineError::Internal(_) => "internal_error",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
