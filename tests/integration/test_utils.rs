//! Shared test utilities: image fixtures and multipart body construction.

use std::io::Cursor;

use axum::body::Body;
use axum::http::{header, Request};
use image::DynamicImage;

/// Multipart boundary used by [`multipart_request`].
pub const BOUNDARY: &str = "pixelpress-test-boundary";

/// Create a PNG-encoded gradient image of the given dimensions.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    encode_gradient(width, height, image::ImageFormat::Png)
}

/// Create a JPEG-encoded gradient image of the given dimensions.
pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode_gradient(width, height, image::ImageFormat::Jpeg)
}

fn encode_gradient(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

/// Check for the PNG magic bytes.
pub fn is_valid_png(data: &[u8]) -> bool {
    data.len() > 8 && data[..8] == [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]
}

/// Check for the JPEG SOI marker.
pub fn is_valid_jpeg(data: &[u8]) -> bool {
    data.len() > 2 && data[0] == 0xFF && data[1] == 0xD8
}

/// Decoded dimensions of an encoded image.
pub fn decoded_dimensions(data: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(data).unwrap();
    (img.width(), img.height())
}

/// Build a multipart form body with an optional metadata field and an image
/// file field carrying the given filename and content type.
pub fn multipart_body(
    metadata: Option<&str>,
    filename: &str,
    content_type: &str,
    image_data: &[u8],
) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some(metadata) = metadata {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"metadata\"\r\n\r\n",
        );
        body.extend_from_slice(metadata.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(image_data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    body
}

/// Build a POST request to `uri` with a multipart body.
pub fn multipart_request(
    uri: &str,
    metadata: Option<&str>,
    filename: &str,
    content_type: &str,
    image_data: &[u8],
) -> Request<Body> {
    let body = multipart_body(metadata, filename, content_type, image_data);

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}
