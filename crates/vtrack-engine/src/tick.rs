//! Detection tick types (§6.1): the raw, not-yet-validated shape an
//! inference engine binding hands back each iteration. Validation into
//! `vtrack-models` value types (`Bbox`, `FaceLandmarks`, ...) happens in
//! the streaming pipeline, which is where invalid detections are
//! dropped rather than here.

use vtrack_models::FrameHandle;

/// A single facial keypoint as the engine reports it: always `(x, y)`,
/// with confidence present only when the engine's model emits it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawKeypoint {
    pub x: f64,
    pub y: f64,
    pub conf: Option<f64>,
}

/// One raw detection within a tick.
#[derive(Debug, Clone)]
pub struct Detection {
    /// `[x1, y1, x2, y2]`, not yet validated against image bounds.
    pub xyxy: [f64; 4],
    pub conf: Option<f64>,
    /// Track id assigned by the engine's own tracker; `None` falls
    /// back to the detection's index within the tick (§4.7 step 2).
    pub id: Option<i64>,
    pub cls: Option<i64>,
    /// Exactly 5 points when present: left-eye, right-eye, nose,
    /// left-mouth, right-mouth.
    pub keypoints: Option<[RawKeypoint; 5]>,
}

/// One iteration of the engine's lazy detection stream.
#[derive(Debug, Clone)]
pub struct DetectionTick {
    pub image: FrameHandle,
    pub detections: Vec<Detection>,
}

impl DetectionTick {
    pub fn new(image: FrameHandle, detections: Vec<Detection>) -> Self {
        Self { image, detections }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_without_track_id_or_keypoints_is_valid() {
        let detection = Detection {
            xyxy: [10.0, 10.0, 50.0, 60.0],
            conf: Some(0.7),
            id: None,
            cls: Some(0),
            keypoints: None,
        };
        assert!(detection.id.is_none());
        assert!(detection.keypoints.is_none());
    }

    #[test]
    fn tick_carries_image_and_detections_together() {
        let image = FrameHandle::new(vec![0u8; 12], 2, 2);
        let tick = DetectionTick::new(
            image,
            vec![Detection {
                xyxy: [0.0, 0.0, 2.0, 2.0],
                conf: Some(1.0),
                id: Some(1),
                cls: None,
                keypoints: None,
            }],
        );
        assert_eq!(tick.detections.len(), 1);
    }
}
