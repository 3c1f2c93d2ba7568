//! Arbitrary-angle rotation with background fill.
//!
//! Exact quarter turns (multiples of 90 degrees) use the lossless rotations
//! from the `image` crate. Any other angle uses inverse mapping: for each
//! pixel of the output canvas we compute which source coordinate lands there
//! and sample it with bilinear interpolation. The output canvas is expanded
//! to the bounding box of the rotated image and exposed background is filled
//! white; nothing is cropped to content.
//!
//! Positive angles rotate counter-clockwise.

use image::{DynamicImage, Rgba, RgbaImage};

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Rotate `image` by `angle` degrees counter-clockwise about its center.
///
/// Never fails for a valid decoded image.
pub fn rotate(image: &DynamicImage, angle: i64) -> DynamicImage {
    // Quarter turns are exact: no resampling, canvas is the rotated rect.
    match angle.rem_euclid(360) {
        0 => return image.clone(),
        90 => return image.rotate270(),
        180 => return image.rotate180(),
        270 => return image.rotate90(),
        _ => {}
    }

    let src = image.to_rgba8();
    let (src_w, src_h) = (src.width() as f64, src.height() as f64);
    let (dst_w, dst_h) = rotated_bounds(src.width(), src.height(), angle as f64);

    // Inverse transform: negated angle, because positive input means a
    // counter-clockwise visual rotation in y-down image coordinates.
    let angle_rad = -(angle as f64).to_radians();
    let cos = angle_rad.cos();
    let sin = angle_rad.sin();

    let src_cx = src_w / 2.0;
    let src_cy = src_h / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    let output = RgbaImage::from_fn(dst_w, dst_h, |dst_x, dst_y| {
        let dx = dst_x as f64 + 0.5 - dst_cx;
        let dy = dst_y as f64 + 0.5 - dst_cy;

        let src_x = dx * cos - dy * sin + src_cx - 0.5;
        let src_y = dx * sin + dy * cos + src_cy - 0.5;

        sample_bilinear(&src, src_x, src_y)
    });

    DynamicImage::ImageRgba8(output)
}

/// Bounding box of a w x h rectangle rotated by `angle_degrees`.
///
/// new_w = |w*cos| + |h*sin|, new_h = |w*sin| + |h*cos|.
fn rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos().abs();
    let sin = angle_rad.sin().abs();

    let w = width as f64;
    let h = height as f64;

    let new_w = (w * cos + h * sin).round() as u32;
    let new_h = (w * sin + h * cos).round() as u32;

    (new_w.max(1), new_h.max(1))
}

/// Bilinear sample at a fractional source coordinate, blending against the
/// white background where the 2x2 neighborhood reaches outside the image.
fn sample_bilinear(src: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (w, h) = (src.width() as i64, src.height() as i64);

    if x < -1.0 || y < -1.0 || x >= w as f64 || y >= h as f64 {
        return BACKGROUND;
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let pixel_or_background = |px: i64, py: i64| -> [f64; 4] {
        if px >= 0 && px < w && py >= 0 && py < h {
            let p = src.get_pixel(px as u32, py as u32).0;
            [p[0] as f64, p[1] as f64, p[2] as f64, p[3] as f64]
        } else {
            [255.0, 255.0, 255.0, 255.0]
        }
    };

    let p00 = pixel_or_background(x0, y0);
    let p10 = pixel_or_background(x0 + 1, y0);
    let p01 = pixel_or_background(x0, y0 + 1);
    let p11 = pixel_or_background(x0 + 1, y0 + 1);

    let mut result = [0u8; 4];
    for i in 0..4 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    Rgba(result)
}

// =============================================================================
// Tests
// =============================================================================
