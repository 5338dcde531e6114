//! Bounding box value type.

use crate::error::{ValidationError, ValidationResult};

/// Axis-aligned bounding box in integer pixel coordinates.
///
/// Invariant: `0 <= x1 < x2` and `0 <= y1 < y2`, enforced at construction.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bbox {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl Bbox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> ValidationResult<Self> {
        if x1 < 0 || y1 < 0 || x1 >= x2 || y1 >= y2 {
            return Err(ValidationError::InvalidBbox { x1, y1, x2, y2 });
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    pub fn xyxy(&self) -> (i32, i32, i32, i32) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.x1 + self.x2) as f64 / 2.0,
            (self.y1 + self.y2) as f64 / 2.0,
        )
    }

    /// Euclidean distance between the centers of two boxes, used by the
    /// movement detector in `Track::add_event`.
    pub fn center_distance(&self, other: &Bbox) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }

    /// Whether this box fits within an image of the given dimensions.
    pub fn within_bounds(&self, width: u32, height: u32) -> bool {
        self.x2 <= width as i32 && self.y2 <= height as i32
    }

    /// Expand the box by `fraction` about its center, clamping the
    /// top-left corner to non-negative coordinates. Used before
    /// submission to the face-recognition backend (§4.8 step 4).
    pub fn expand(&self, fraction: f64) -> (i32, i32, i32, i32) {
        let w = self.width() as f64;
        let h = self.height() as f64;
        let expand_w = w * fraction / 2.0;
        let expand_h = h * fraction / 2.0;
        let new_x1 = (self.x1 as f64 - expand_w).max(0.0);
        let new_y1 = (self.y1 as f64 - expand_h).max(0.0);
        let new_x2 = self.x2 as f64 + expand_w;
        let new_y2 = self.y2 as f64 + expand_h;
        (
            new_x1.round() as i32,
            new_y1.round() as i32,
            new_x2.round() as i32,
            new_y2.round() as i32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_boxes() {
        assert!(Bbox::new(10, 10, 10, 20).is_err());
        assert!(Bbox::new(-1, 0, 10, 10).is_err());
        assert!(Bbox::new(0, 0, 10, 10).is_ok());
    }

    #[test]
    fn center_distance_matches_euclidean() {
        let a = Bbox::new(0, 0, 10, 10).unwrap();
        let b = Bbox::new(3, 4, 13, 14).unwrap();
        assert!((a.center_distance(&b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn expand_clamps_to_non_negative() {
        let b = Bbox::new(0, 0, 10, 10).unwrap();
        let (x1, y1, x2, y2) = b.expand(0.2);
        assert_eq!((x1, y1), (0, 0));
        assert_eq!((x2, y2), (11, 11));
    }
}
