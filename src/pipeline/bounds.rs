//! Decoded-image bounds validation.
//!
//! The upload size ceiling only bounds the encoded byte count; a small file
//! can still decode to a huge pixel buffer. This check caps the memory and
//! CPU cost of the transforms that follow (resize and rotate in particular)
//! by rejecting images above a configured dimension ceiling.

use image::DynamicImage;

use crate::error::PipelineError;

/// Check decoded dimensions against the ceiling.
///
/// Pure and synchronous. Called exactly once per successful decode, before
/// any transform runs. Returns `BoundsExceeded` when either dimension is
/// above `max_dimension`.
pub fn check_bounds(image: &DynamicImage, max_dimension: u32) -> Result<(), PipelineError> {
    let (width, height) = (image.width(), image.height());

    if width > max_dimension || height > max_dimension {
        return Err(PipelineError::BoundsExceeded {
            width,
            height,
            limit: max_dimension,
        });
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
