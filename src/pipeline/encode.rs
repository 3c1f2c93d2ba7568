//! Output encoding for transformed images.
//!
//! Encodes a pixel buffer as PNG or JPEG. The JPEG encoder in the `image`
//! crate rejects alpha channels, so JPEG output always goes through an RGB8
//! conversion first; PNG output keeps whatever color type the transform
//! produced.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::error::PipelineError;
use crate::media::ImageFormat;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Encode `image` in the given format.
///
/// JPEG quality is clamped to the valid range. Encode failures surface as
/// `Internal`; the pipeline decides whether an elapsed deadline overrides
/// that classification.
pub fn encode(
    image: &DynamicImage,
    format: ImageFormat,
    jpeg_quality: u8,
) -> Result<Bytes, PipelineError> {
    let mut buf = Vec::new();

    match format {
        ImageFormat::Png => {
            image
                .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
                .map_err(|e| PipelineError::Internal(e.to_string()))?;
        }
        ImageFormat::Jpeg => {
            let quality = jpeg_quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY);
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());

            let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            encoder
                .encode_image(&rgb)
                .map_err(|e| PipelineError::Internal(e.to_string()))?;
        }
    }

    Ok(Bytes::from(buf))
}

// =============================================================================
// Tests
// =============================================================================
