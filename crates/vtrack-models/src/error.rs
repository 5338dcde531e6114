//! Validation errors for the value types in this crate.

use thiserror::Error;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// A detection or identifier failed construction-time validation.
///
/// Per the error taxonomy, a `ValidationError` is never fatal: the
/// offending detection is dropped at the call site and the pipeline
/// continues.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("camera id must be non-negative, got {0}")]
    NegativeCameraId(i64),

    #[error("bbox must satisfy 0 <= x1 < x2 and 0 <= y1 < y2, got ({x1}, {y1}, {x2}, {y2})")]
    InvalidBbox { x1: i32, y1: i32, x2: i32, y2: i32 },

    #[error("confidence must be in [0, 1], got {0}")]
    InvalidConfidence(f64),

    #[error("face landmarks require exactly 5 keypoints, got {0}")]
    InvalidLandmarkCount(usize),

    #[error("track id 0 is reserved and must be ignored")]
    ReservedTrackId,

    #[error("JPEG encoding failed: {0}")]
    JpegEncode(String),
}
