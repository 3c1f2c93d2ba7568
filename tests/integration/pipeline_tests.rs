//! Pipeline integration tests below the HTTP layer.
//!
//! These exercise [`Pipeline::run`] directly against real encoded blobs,
//! covering behavior the API tests only observe through status codes:
//! pixel-level transform results, output encoding, and deadline semantics.

use std::time::Duration;

use pixelpress::media::{ImageBlob, ImageFormat};
use pixelpress::pipeline::{Pipeline, PipelineLimits};
use pixelpress::transform::{FlipDirection, Operation};
use pixelpress::PipelineError;

use super::test_utils::{create_test_jpeg, create_test_png};

fn test_pipeline() -> Pipeline {
    Pipeline::new(PipelineLimits::default())
}

fn png_blob(width: u32, height: u32) -> ImageBlob {
    ImageBlob::new(create_test_png(width, height), ImageFormat::Png)
}

// =============================================================================
// Transform Semantics
// =============================================================================

#[tokio::test]
async fn test_flip_horizontal_mirrors_pixels() {
    let blob = png_blob(64, 16);
    let original = image::load_from_memory(&blob.data).unwrap().to_rgb8();

    let outcome = test_pipeline()
        .run(
            &blob,
            &Operation::Flip {
                direction: FlipDirection::Horizontal,
            },
        )
        .await
        .unwrap();

    let flipped = image::load_from_memory(&outcome.data).unwrap().to_rgb8();
    assert_eq!(flipped.get_pixel(0, 0), original.get_pixel(63, 0));
    assert_eq!(flipped.get_pixel(63, 5), original.get_pixel(0, 5));
}

#[tokio::test]
async fn test_flip_vertical_mirrors_pixels() {
    let blob = png_blob(16, 64);
    let original = image::load_from_memory(&blob.data).unwrap().to_rgb8();

    let outcome = test_pipeline()
        .run(
            &blob,
            &Operation::Flip {
                direction: FlipDirection::Vertical,
            },
        )
        .await
        .unwrap();

    let flipped = image::load_from_memory(&outcome.data).unwrap().to_rgb8();
    assert_eq!(flipped.get_pixel(0, 0), original.get_pixel(0, 63));
}

#[tokio::test]
async fn test_grayscale_equalizes_channels() {
    let outcome = test_pipeline()
        .run(&png_blob(32, 32), &Operation::Grayscale)
        .await
        .unwrap();

    let gray = image::load_from_memory(&outcome.data).unwrap().to_rgb8();
    for pixel in gray.pixels() {
        assert_eq!(pixel[0], pixel[1]);
        assert_eq!(pixel[1], pixel[2]);
    }
}

#[tokio::test]
async fn test_crop_extracts_expected_region() {
    let blob = png_blob(100, 100);
    let original = image::load_from_memory(&blob.data).unwrap().to_rgb8();

    let outcome = test_pipeline()
        .run(
            &blob,
            &Operation::Crop {
                min_x: 10,
                min_y: 20,
                max_x: 40,
                max_y: 50,
            },
        )
        .await
        .unwrap();

    let cropped = image::load_from_memory(&outcome.data).unwrap().to_rgb8();
    assert_eq!((cropped.width(), cropped.height()), (30, 30));
    assert_eq!(cropped.get_pixel(0, 0), original.get_pixel(10, 20));
}

#[tokio::test]
async fn test_resize_height_only_preserves_aspect() {
    let outcome = test_pipeline()
        .run(
            &png_blob(200, 100),
            &Operation::Resize {
                width: None,
                height: Some(50),
            },
        )
        .await
        .unwrap();

    let resized = image::load_from_memory(&outcome.data).unwrap();
    assert_eq!((resized.width(), resized.height()), (100, 50));
}

// =============================================================================
// Output Encoding
// =============================================================================

#[tokio::test]
async fn test_output_keeps_source_format() {
    let blob = ImageBlob::new(create_test_jpeg(32, 32), ImageFormat::Jpeg);

    let outcome = test_pipeline()
        .run(&blob, &Operation::Grayscale)
        .await
        .unwrap();

    assert_eq!(outcome.media_type, "image/jpeg");
    assert_eq!(&outcome.data[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn test_change_format_reencodes_pixels() {
    let blob = png_blob(32, 32);

    let outcome = test_pipeline()
        .run(
            &blob,
            &Operation::ChangeFormat {
                target: ImageFormat::Jpeg,
            },
        )
        .await
        .unwrap();

    // Dimensions survive; lossy encoding means pixel values may not.
    let converted = image::load_from_memory(&outcome.data).unwrap();
    assert_eq!((converted.width(), converted.height()), (32, 32));
}

// =============================================================================
// Deadline Semantics
// =============================================================================

#[tokio::test]
async fn test_zero_deadline_beats_valid_input() {
    let pipeline = Pipeline::new(PipelineLimits {
        deadline: Duration::ZERO,
        ..PipelineLimits::default()
    });

    let result = pipeline.run(&png_blob(16, 16), &Operation::Grayscale).await;
    assert!(matches!(result, Err(PipelineError::Timeout)));
}

#[tokio::test]
async fn test_invalid_params_beat_zero_deadline() {
    // Parameter validation precedes the first deadline checkpoint.
    let pipeline = Pipeline::new(PipelineLimits {
        deadline: Duration::ZERO,
        ..PipelineLimits::default()
    });

    let result = pipeline
        .run(
            &png_blob(16, 16),
            &Operation::Resize {
                width: None,
                height: None,
            },
        )
        .await;
    assert!(matches!(result, Err(PipelineError::InvalidInput(_))));
}

#[tokio::test]
async fn test_generous_deadline_succeeds() {
    let pipeline = Pipeline::new(PipelineLimits {
        deadline: Duration::from_secs(60),
        ..PipelineLimits::default()
    });

    let result = pipeline
        .run(&png_blob(500, 500), &Operation::Rotate { angle: 37 })
        .await;
    assert!(result.is_ok());
}

// =============================================================================
// Limits
// =============================================================================

#[tokio::test]
async fn test_custom_max_dimension_enforced() {
    let pipeline = Pipeline::new(PipelineLimits {
        max_dimension: 64,
        ..PipelineLimits::default()
    });

    let result = pipeline.run(&png_blob(65, 10), &Operation::Grayscale).await;
    assert!(matches!(
        result,
        Err(PipelineError::BoundsExceeded { limit: 64, .. })
    ));

    let result = pipeline.run(&png_blob(64, 64), &Operation::Grayscale).await;
    assert!(result.is_ok());
}
