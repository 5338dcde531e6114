//! Per-tick detection frame.

use crate::bbox::Bbox;
use crate::camera::Camera;
use crate::frame_handle::FrameHandle;
use crate::landmarks::FaceLandmarks;
use crate::timestamp::Timestamp;

/// One inference tick's detections over a single captured image.
///
/// Invariant: `bboxes`, `landmarks`, `track_ids`, `confidences` and
/// `classes` all share the same length — one entry per detection.
/// Created once per tick by the streaming pipeline (C8); dropped once
/// every [`crate::Event`] that shares it via [`Self::handle`] is released.
#[derive(Debug, Clone)]
pub struct Frame {
    pub handle: FrameHandle,
    pub camera: Camera,
    pub captured_at: Timestamp,
    pub bboxes: Vec<Bbox>,
    pub landmarks: Vec<Option<FaceLandmarks>>,
    pub track_ids: Vec<i64>,
    pub confidences: Vec<f64>,
    pub classes: Vec<Option<i64>>,
}

impl Frame {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        handle: FrameHandle,
        camera: Camera,
        captured_at: Timestamp,
        bboxes: Vec<Bbox>,
        landmarks: Vec<Option<FaceLandmarks>>,
        track_ids: Vec<i64>,
        confidences: Vec<f64>,
        classes: Vec<Option<i64>>,
    ) -> Self {
        let n = bboxes.len();
        debug_assert_eq!(landmarks.len(), n);
        debug_assert_eq!(track_ids.len(), n);
        debug_assert_eq!(confidences.len(), n);
        debug_assert_eq!(classes.len(), n);
        Self {
            handle,
            camera,
            captured_at,
            bboxes,
            landmarks,
            track_ids,
            confidences,
            classes,
        }
    }

    pub fn detection_count(&self) -> usize {
        self.bboxes.len()
    }
}
