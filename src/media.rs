//! Blob and format types shared between the request adapter and the pipeline.
//!
//! The service accepts exactly two raster formats, PNG and JPEG. `jpg` and
//! `jpeg` are spellings of the same canonical format and compare equal.

use bytes::Bytes;

/// A supported encoded image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Parse a format from a filename extension (without the dot).
    ///
    /// Matching is case-insensitive; `jpg` and `jpeg` both map to
    /// [`ImageFormat::Jpeg`]. Returns `None` for anything else.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpeg" | "jpg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    /// Parse a format from a declared media type.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    /// The media type used in HTTP responses for this format.
    pub fn media_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    /// Canonical name of this format.
    pub fn name(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }
}

/// An uploaded image: raw encoded bytes plus the declared format.
///
/// Immutable once received. Owned by the request adapter and borrowed by the
/// pipeline for the duration of a single operation.
#[derive(Debug, Clone)]
pub struct ImageBlob {
    /// The raw encoded bytes as received.
    pub data: Bytes,

    /// Format declared by the upload (extension and content type agree by
    /// the time a blob is constructed).
    pub format: ImageFormat,
}

impl ImageBlob {
    /// Create a blob from raw bytes and a declared format.
    pub fn new(data: impl Into<Bytes>, format: ImageFormat) -> Self {
        Self {
            data: data.into(),
            format,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
