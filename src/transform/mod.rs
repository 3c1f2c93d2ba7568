//! Operation variants and the transform dispatcher.
//!
//! One request carries exactly one [`Operation`]. Parameter validation is
//! split in two: [`Operation::validate`] covers everything checkable before
//! decode (ranges, orderings, no-op format conversions), and [`apply`]
//! re-checks the crop rectangle against the decoded bounds, which are only
//! known after decode. The dispatcher itself is a pure mapping with no
//! suspension points; every variant either transforms the pixel buffer or
//! fails with `InvalidInput`.

mod rotate;

use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::PipelineError;
use crate::media::ImageFormat;

pub use rotate::rotate;

/// Resize dimensions must be strictly below this value (and above zero).
pub const MAX_RESIZE_DIMENSION: i64 = 2000;

// =============================================================================
// Operation Variants
// =============================================================================

/// Direction for the flip operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    /// Mirror across the vertical axis.
    Horizontal,
    /// Mirror across the horizontal axis.
    Vertical,
}

impl FlipDirection {
    /// Parse a direction, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "horizontal" => Some(FlipDirection::Horizontal),
            "vertical" => Some(FlipDirection::Vertical),
            _ => None,
        }
    }
}

/// One requested image transformation.
///
/// Bounds and dimensions are carried as `i64` so that negative
/// caller-supplied values survive parsing and are rejected by
/// [`Operation::validate`] rather than by a lossy cast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Rotate by `angle` degrees counter-clockwise (any signed integer),
    /// filling exposed background with white.
    Rotate { angle: i64 },

    /// Crop to the rectangle [min_x, max_x) x [min_y, max_y).
    Crop {
        min_x: i64,
        min_y: i64,
        max_x: i64,
        max_y: i64,
    },

    /// Resize to the given dimensions. With one dimension omitted the other
    /// is computed preserving aspect ratio; with both given the image is
    /// stretched to exactly width x height.
    Resize {
        width: Option<i64>,
        height: Option<i64>,
    },

    /// Mirror the image.
    Flip { direction: FlipDirection },

    /// Luminance-preserving desaturation.
    Grayscale,

    /// Re-encode in `target` format without touching the pixels.
    ChangeFormat { target: ImageFormat },
}

impl Operation {
    /// Name of this operation, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Rotate { .. } => "rotate",
            Operation::Crop { .. } => "crop",
            Operation::Resize { .. } => "resize",
            Operation::Flip { .. } => "flip",
            Operation::Grayscale => "grayscale",
            Operation::ChangeFormat { .. } => "changeformat",
        }
    }

    /// Validate parameters that do not depend on the decoded image.
    ///
    /// Called by the pipeline before decode begins, so malformed requests
    /// never pay for a decode.
    pub fn validate(&self, source: ImageFormat) -> Result<(), PipelineError> {
        match self {
            Operation::Rotate { .. } | Operation::Flip { .. } | Operation::Grayscale => Ok(()),

            Operation::Crop {
                min_x,
                min_y,
                max_x,
                max_y,
            } => {
                if *min_x < 0 || *min_y < 0 || *max_x < 0 || *max_y < 0 {
                    return Err(PipelineError::InvalidInput(
                        "crop bounds must not be negative".to_string(),
                    ));
                }
                if max_x < min_x || max_y < min_y {
                    return Err(PipelineError::InvalidInput(
                        "crop bounds are inverted".to_string(),
                    ));
                }
                Ok(())
            }

            Operation::Resize { width, height } => {
                if width.is_none() && height.is_none() {
                    return Err(PipelineError::InvalidInput(
                        "at least one of width or height is required".to_string(),
                    ));
                }
                for value in [width, height].into_iter().flatten() {
                    if *value <= 0 || *value >= MAX_RESIZE_DIMENSION {
                        return Err(PipelineError::InvalidInput(format!(
                            "resize dimensions must be between 1 and {}",
                            MAX_RESIZE_DIMENSION - 1
                        )));
                    }
                }
                Ok(())
            }

            Operation::ChangeFormat { target } => {
                if *target == source {
                    return Err(PipelineError::InvalidInput(format!(
                        "image is already {}",
                        source.name()
                    )));
                }
                Ok(())
            }
        }
    }

    /// The encoding format of the output for this operation.
    pub fn output_format(&self, source: ImageFormat) -> ImageFormat {
        match self {
            Operation::ChangeFormat { target } => *target,
            _ => source,
        }
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Apply one operation to a decoded image.
///
/// Pure and synchronous. Assumes [`Operation::validate`] already passed;
/// only the crop containment check can still fail here, because it needs the
/// decoded dimensions.
pub fn apply(image: DynamicImage, op: &Operation) -> Result<DynamicImage, PipelineError> {
    match op {
        Operation::Rotate { angle } => Ok(rotate(&image, *angle)),

        Operation::Crop {
            min_x,
            min_y,
            max_x,
            max_y,
        } => {
            if *max_x > image.width() as i64 || *max_y > image.height() as i64 {
                return Err(PipelineError::InvalidInput(
                    "crop rectangle is outside the image bounds".to_string(),
                ));
            }
            Ok(image.crop_imm(
                *min_x as u32,
                *min_y as u32,
                (max_x - min_x) as u32,
                (max_y - min_y) as u32,
            ))
        }

        Operation::Resize { width, height } => {
            let (target_w, target_h) = resolve_resize_dimensions(
                image.width(),
                image.height(),
                width.map(|w| w as u32),
                height.map(|h| h as u32),
            );
            Ok(image.resize_exact(target_w, target_h, FilterType::Lanczos3))
        }

        Operation::Flip { direction } => Ok(match direction {
            FlipDirection::Horizontal => image.fliph(),
            FlipDirection::Vertical => image.flipv(),
        }),

        Operation::Grayscale => Ok(image.grayscale()),

        // Only the output encoding changes; pixels pass through untouched.
        Operation::ChangeFormat { .. } => Ok(image),
    }
}

/// Resolve the output dimensions for a resize.
///
/// An omitted dimension is computed from the other one preserving the
/// source aspect ratio, rounding to the nearest pixel.
fn resolve_resize_dimensions(
    src_w: u32,
    src_h: u32,
    width: Option<u32>,
    height: Option<u32>,
) -> (u32, u32) {
    match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => {
            let h = (src_h as f64 * w as f64 / src_w as f64).round() as u32;
            (w, h.max(1))
        }
        (None, Some(h)) => {
            let w = (src_w as f64 * h as f64 / src_h as f64).round() as u32;
            (w.max(1), h)
        }
        // Unreachable after validate(), but harmless.
        (None, None) => (src_w, src_h),
    }
}

// =============================================================================
// Tests
// =============================================================================
