//! A single detection within a Frame.

use std::sync::Arc;

use crate::bbox::Bbox;
use crate::confidence::Confidence;
use crate::frame::Frame;
use crate::ids::TrackId;
use crate::landmarks::FaceLandmarks;

/// A single detection, the atomic unit that eventually reaches the
/// dispatch queue (C5) and the face-recognition backend.
///
/// Invariant: `track_id` is never the reserved `0` value — callers
/// validate this before constructing an `Event` (§3.2).
#[derive(Debug, Clone)]
pub struct Event {
    frame: Option<Arc<Frame>>,
    pub bbox: Bbox,
    pub confidence: Confidence,
    pub landmarks: Option<FaceLandmarks>,
    pub track_id: TrackId,
    pub face_quality_score: Option<f64>,
    pub class_id: Option<i64>,
    /// Set by the finish service (§4.5 step 4) from the owning track's
    /// `has_movement`, so the dispatch worker can apply the movement
    /// filter (§4.8 step 2) without needing the track back.
    pub has_movement: bool,
}

impl Event {
    pub fn new(
        frame: Arc<Frame>,
        bbox: Bbox,
        confidence: Confidence,
        landmarks: Option<FaceLandmarks>,
        track_id: TrackId,
        face_quality_score: Option<f64>,
        class_id: Option<i64>,
    ) -> Self {
        Self {
            frame: Some(frame),
            bbox,
            confidence,
            landmarks,
            track_id,
            face_quality_score,
            class_id,
            has_movement: false,
        }
    }

    pub fn frame(&self) -> Option<&Arc<Frame>> {
        self.frame.as_ref()
    }

    /// Break the back-reference to the owning Frame so its buffer can be
    /// reclaimed once no other Event holds it (§3.2, §4.2 step 7).
    pub fn release_frame(&mut self) {
        self.frame = None;
    }

    /// Quality used for best-event comparison: the frontal-face score
    /// when present, falling back to detection confidence (§4.2 step 7).
    pub fn quality(&self) -> f64 {
        self.face_quality_score.unwrap_or(self.confidence.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::frame_handle::FrameHandle;
    use crate::ids::CameraId;
    use crate::timestamp::Timestamp;

    fn sample_frame() -> Arc<Frame> {
        Arc::new(Frame::new(
            FrameHandle::new(vec![0u8; 12], 2, 2),
            Camera {
                id: CameraId::new(1).unwrap(),
                name: "cam".into(),
                token: "tok".into(),
                rtsp_url: "rtsp://x".into(),
                active: true,
            },
            Timestamp::now(),
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
        ))
    }

    #[test]
    fn release_frame_drops_backreference() {
        let frame = sample_frame();
        let mut event = Event::new(
            frame.clone(),
            Bbox::new(0, 0, 1, 1).unwrap(),
            Confidence::new(0.9).unwrap(),
            None,
            TrackId::new(1),
            None,
            None,
        );
        assert!(event.frame().is_some());
        event.release_frame();
        assert!(event.frame().is_none());
    }

    #[test]
    fn quality_falls_back_to_confidence() {
        let frame = sample_frame();
        let event = Event::new(
            frame,
            Bbox::new(0, 0, 1, 1).unwrap(),
            Confidence::new(0.4).unwrap(),
            None,
            TrackId::new(1),
            None,
            None,
        );
        assert_eq!(event.quality(), 0.4);
    }
}
