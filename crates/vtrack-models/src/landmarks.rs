//! Facial landmark value type.

use crate::error::{ValidationError, ValidationResult};

/// A single facial keypoint: pixel coordinates plus an optional
/// per-point confidence. When the inference engine emits only `(x, y)`,
/// confidence defaults to `1.0` (§3.1).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    pub conf: f64,
}

impl Keypoint {
    pub fn new(x: f64, y: f64, conf: f64) -> Self {
        Self { x, y, conf }
    }

    pub fn from_xy(x: f64, y: f64) -> Self {
        Self { x, y, conf: 1.0 }
    }
}

/// Exactly 5 ordered facial keypoints: left-eye, right-eye, nose,
/// left-mouth, right-mouth.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FaceLandmarks([Keypoint; 5]);

impl FaceLandmarks {
    pub fn new(points: [Keypoint; 5]) -> Self {
        Self(points)
    }

    /// Build from a variable-length sequence, validating the count.
    pub fn from_slice(points: &[Keypoint]) -> ValidationResult<Self> {
        let array: [Keypoint; 5] = points
            .try_into()
            .map_err(|_| ValidationError::InvalidLandmarkCount(points.len()))?;
        Ok(Self(array))
    }

    pub fn left_eye(&self) -> Keypoint {
        self.0[0]
    }

    pub fn right_eye(&self) -> Keypoint {
        self.0[1]
    }

    pub fn nose(&self) -> Keypoint {
        self.0[2]
    }

    pub fn left_mouth(&self) -> Keypoint {
        self.0[3]
    }

    pub fn right_mouth(&self) -> Keypoint {
        self.0[4]
    }

    pub fn points(&self) -> &[Keypoint; 5] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FaceLandmarks {
        FaceLandmarks::new([
            Keypoint::from_xy(10.0, 10.0),
            Keypoint::from_xy(50.0, 10.0),
            Keypoint::from_xy(30.0, 30.0),
            Keypoint::from_xy(15.0, 50.0),
            Keypoint::from_xy(45.0, 50.0),
        ])
    }

    #[test]
    fn from_slice_rejects_wrong_count() {
        let points = sample();
        assert!(FaceLandmarks::from_slice(&points.points()[..4]).is_err());
        assert!(FaceLandmarks::from_slice(points.points()).is_ok());
    }

    #[test]
    fn accessors_follow_documented_order() {
        let lm = sample();
        assert_eq!(lm.left_eye().x, 10.0);
        assert_eq!(lm.right_eye().x, 50.0);
        assert_eq!(lm.nose().y, 30.0);
    }
}
