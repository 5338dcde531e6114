//! Identifier value types: [`CameraId`] and [`TrackId`].

use std::fmt;

use crate::error::{ValidationError, ValidationResult};

/// A remote camera's stable identifier.
///
/// Non-negative by construction; `CameraId::new` rejects negative values
/// the way the registry and camera-group fetch would otherwise propagate
/// a garbage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct CameraId(i64);

impl CameraId {
    pub fn new(value: i64) -> ValidationResult<Self> {
        if value < 0 {
            return Err(ValidationError::NegativeCameraId(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A per-camera subject identifier assigned by the inference engine's
/// tracker.
///
/// `0` is reserved by the engine's contract (§6.1) to mean "no track
/// assigned" and must be ignored wherever it appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct TrackId(i64);

impl TrackId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// `true` for the reserved sentinel value that must be ignored.
    pub fn is_reserved(&self) -> bool {
        self.0 == 0
    }

    /// Validate that this id is usable as a track key, i.e. not the
    /// reserved sentinel.
    pub fn require_non_reserved(self) -> ValidationResult<Self> {
        if self.is_reserved() {
            return Err(ValidationError::ReservedTrackId);
        }
        Ok(self)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_id_rejects_negative() {
        assert!(CameraId::new(-1).is_err());
        assert!(CameraId::new(0).is_ok());
    }

    #[test]
    fn track_id_zero_is_reserved() {
        assert!(TrackId::new(0).is_reserved());
        assert!(TrackId::new(0).require_non_reserved().is_err());
        assert!(TrackId::new(7).require_non_reserved().is_ok());
    }
}
