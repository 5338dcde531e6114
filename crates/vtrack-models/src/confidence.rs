//! Confidence value type.

use crate::error::{ValidationError, ValidationResult};

/// A detection confidence in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct Confidence(f64);

impl Confidence {
    pub fn new(value: f64) -> ValidationResult<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::InvalidConfidence(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}
