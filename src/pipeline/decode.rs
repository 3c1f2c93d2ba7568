//! Deadline-raced image decoding.
//!
//! Decoding untrusted bytes is CPU-bound and can be slow or pathological, so
//! it runs on the blocking pool and is raced against the operation deadline.
//! The caller waits for the first of three signals - decode success, decode
//! error, deadline expiry - and takes only the first to arrive.
//!
//! When the deadline wins, the blocking task is abandoned rather than
//! joined: its result is sent into a oneshot channel whose receiver has been
//! dropped, and the runtime reclaims the task when it finishes. An
//! already-expired budget can never surface a late success because the
//! `select!` is biased with the deadline arm first.

use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, ImageReader};
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::PipelineError;

use super::DeadlineBudget;

/// Decode an uploaded blob off the calling task, racing the deadline.
///
/// Returns the decoded image, `InvalidImage` if the bytes are corrupt or in
/// an unsupported encoding, or `Timeout` if the budget expires first.
pub async fn decode_raced(
    data: Bytes,
    budget: &DeadlineBudget,
) -> Result<DynamicImage, PipelineError> {
    let (tx, rx) = oneshot::channel();

    tokio::task::spawn_blocking(move || {
        // The receiver may already be gone if the deadline fired; the send
        // result is intentionally ignored.
        let _ = tx.send(decode_blocking(&data));
    });

    tokio::select! {
        biased;

        _ = tokio::time::sleep_until(budget.deadline()) => {
            debug!("deadline fired while decoding; abandoning decode task");
            Err(PipelineError::Timeout)
        }

        result = rx => match result {
            Ok(Ok(image)) => Ok(image),
            Ok(Err(err)) => Err(err),
            // The decode task panicked and dropped the sender.
            Err(_) => Err(PipelineError::Internal("decode task failed".to_string())),
        }
    }
}

/// Synchronous decode of the raw bytes, guessing the format from content.
fn decode_blocking(data: &[u8]) -> Result<DynamicImage, PipelineError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| PipelineError::InvalidImage(e.to_string()))?;

    reader
        .decode()
        .map_err(|e| PipelineError::InvalidImage(e.to_string()))
}

// =============================================================================
// Tests
// =============================================================================
