//! Per-camera streaming pipeline (C8, §4.7): drives one camera's
//! inference tick stream, builds Frames and Events, and folds them
//! into the Track Registry.

use std::sync::Arc;

use tokio::sync::watch;
use vtrack_engine::{DetectionEngine, ModelParams};
use vtrack_models::{Bbox, Camera, Event, Frame, FaceLandmarks, Confidence, Keypoint, Timestamp, Track, TrackId, TrackLimits};
use vtrack_tracking::{frontal_face_score, FinishReason, FinishService, TrackRegistry};

use crate::config::{AppConfig, FilterConfig, TrackConfig};
use crate::error::PipelineError;
use crate::logging::CameraLogger;

/// Lifecycle states a streaming pipeline walks through exactly once
/// (§4.7 "State machine"); never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// Runs camera `camera`'s tick stream to completion, to a fatal engine
/// error, or to the `stop` signal, whichever comes first.
pub async fn run(
    camera: Camera,
    engine: Arc<dyn DetectionEngine>,
    track_model: ModelParams,
    face_model: ModelParams,
    registry: Arc<TrackRegistry>,
    finisher: Arc<FinishService>,
    config: Arc<AppConfig>,
    mut stop: watch::Receiver<bool>,
) -> PipelineState {
    let logger = CameraLogger::new(camera.id.value());
    logger.info("streaming pipeline starting");

    let mut stream = match engine.open(&camera.rtsp_url, &track_model, &face_model).await {
        Ok(stream) => stream,
        Err(err) => {
            logger.error(&format!("failed to open inference stream: {err}"));
            drain_camera(&camera, &registry, &finisher).await;
            return PipelineState::Stopped;
        }
    };

    logger.info("streaming pipeline running");
    let mut frame_counter: u64 = 0;
    let skip_frames = config.performance.skip_frames as u64;

    loop {
        tokio::select! {
            _ = stop.changed() => {
                if *stop.borrow() {
                    break;
                }
            }
            tick = stream.next_tick() => {
                match tick {
                    Ok(Some(tick)) => {
                        frame_counter += 1;
                        if skip_frames > 0 && frame_counter % (skip_frames + 1) != 0 {
                            continue;
                        }
                        if let Err(err) = process_tick(
                            &camera,
                            tick,
                            &registry,
                            &finisher,
                            &config.filter,
                            &config.track,
                            &logger,
                        )
                        .await
                        {
                            logger.warn(&format!("dropped tick: {err}"));
                        }
                    }
                    Ok(None) => {
                        logger.info("inference stream ended");
                        break;
                    }
                    Err(err) => {
                        logger.error(&format!("inference engine error: {err}"));
                        break;
                    }
                }
            }
        }
    }

    logger.info("streaming pipeline stopping");
    drain_camera(&camera, &registry, &finisher).await;
    logger.info("streaming pipeline stopped");
    PipelineState::Stopped
}

/// Finish every track still open for `camera` when its pipeline stops,
/// so their best events still reach the dispatch queue (§4.9 step 3,
/// "CameraStopped" in the SUPPLEMENTED finish reasons).
async fn drain_camera(camera: &Camera, registry: &TrackRegistry, finisher: &FinishService) {
    for track_id in registry.track_ids(camera.id).await {
        finisher.finish(camera.id, track_id, FinishReason::CameraStopped).await;
    }
}

async fn process_tick(
    camera: &Camera,
    tick: vtrack_engine::DetectionTick,
    registry: &TrackRegistry,
    finisher: &FinishService,
    filter: &FilterConfig,
    track_config: &TrackConfig,
    logger: &CameraLogger,
) -> Result<(), PipelineError> {
    let captured_at = Timestamp::now();
    let width = tick.image.width();
    let height = tick.image.height();

    let mut bboxes = Vec::new();
    let mut landmarks = Vec::new();
    let mut track_ids = Vec::new();
    let mut confidences = Vec::new();
    let mut classes = Vec::new();

    for (index, detection) in tick.detections.iter().enumerate() {
        let [x1, y1, x2, y2] = detection.xyxy;
        let Ok(bbox) = Bbox::new(x1.round() as i32, y1.round() as i32, x2.round() as i32, y2.round() as i32) else {
            continue;
        };
        if !bbox.within_bounds(width, height) {
            continue;
        }

        let lm = detection.keypoints.map(|points| {
            let kps: [Keypoint; 5] = points.map(|p| Keypoint::new(p.x, p.y, p.conf.unwrap_or(1.0)));
            FaceLandmarks::new(kps)
        });
        let confidence = detection.conf.unwrap_or(1.0).clamp(0.0, 1.0);
        let raw_track_id = detection.id.unwrap_or(index as i64);

        bboxes.push(bbox);
        landmarks.push(lm);
        track_ids.push(raw_track_id);
        confidences.push(confidence);
        classes.push(detection.cls);
    }

    let frame = Arc::new(Frame::new(
        tick.image,
        camera.clone(),
        captured_at,
        bboxes,
        landmarks,
        track_ids,
        confidences,
        classes,
    ));

    for index in 0..frame.detection_count() {
        let bbox = frame.bboxes[index];
        let raw_track_id = frame.track_ids[index];
        let confidence = frame.confidences[index];

        if bbox.area() < filter.min_box_area || confidence < filter.min_box_conf {
            continue;
        }
        let track_id = TrackId::new(raw_track_id);
        if track_id.is_reserved() {
            continue;
        }

        let quality = frame.landmarks[index].map(|lm| frontal_face_score(&lm));
        let event = Event::new(
            Arc::clone(&frame),
            bbox,
            Confidence::new(confidence)?,
            frame.landmarks[index],
            track_id,
            quality,
            frame.classes[index],
        );

        // The external lock shared with the finish service (§4.1, §5):
        // serializes this get-or-create-then-add_event sequence against
        // a concurrent TTL sweep or saturation finish on the same track.
        let _guard = finisher.lock().await;
        match registry.get(camera.id, track_id).await {
            Some(mut track) => {
                track.add_event(event);
                let saturated = track.is_saturated();
                registry.register(camera.id, track_id, track).await;
                drop(_guard);
                if saturated {
                    finisher.finish(camera.id, track_id, FinishReason::Saturation).await;
                }
            }
            None => {
                let limits = TrackLimits {
                    max_events: track_config.max_events,
                    min_movement_pixels: track_config.min_movement_pixels,
                    lost_ttl: track_config.lost_ttl(),
                    active_ttl: track_config.active_ttl(),
                };
                let mut track = Track::new(track_id, limits);
                track.add_event(event);
                registry.register(camera.id, track_id, track).await;
                drop(_guard);
            }
        }
    }

    logger.info(&format!("processed tick with {} detections", frame.detection_count()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use vtrack_engine::{DetectionTick, RawKeypoint};
    use vtrack_models::{CameraId, FrameHandle};
    use vtrack_tracking::DispatchQueue;

    fn camera() -> Camera {
        Camera {
            id: CameraId::new(1).unwrap(),
            name: "cam".into(),
            token: "tok".into(),
            rtsp_url: "rtsp://x".into(),
            active: true,
        }
    }

    fn frontal_keypoints() -> [vtrack_engine::RawKeypoint; 5] {
        [
            RawKeypoint { x: 10.0, y: 10.0, conf: Some(1.0) },
            RawKeypoint { x: 50.0, y: 10.0, conf: Some(1.0) },
            RawKeypoint { x: 30.0, y: 30.0, conf: Some(1.0) },
            RawKeypoint { x: 15.0, y: 50.0, conf: Some(1.0) },
            RawKeypoint { x: 45.0, y: 50.0, conf: Some(1.0) },
        ]
    }

    struct OneShotStream {
        ticks: StdMutex<Vec<DetectionTick>>,
    }

    #[async_trait]
    impl vtrack_engine::TickStream for OneShotStream {
        async fn next_tick(&mut self) -> vtrack_engine::EngineResult<Option<DetectionTick>> {
            Ok(self.ticks.lock().unwrap().pop())
        }
    }

    struct OneShotEngine {
        ticks: StdMutex<Option<Vec<DetectionTick>>>,
    }

    #[async_trait]
    impl DetectionEngine for OneShotEngine {
        async fn open(
            &self,
            _source_url: &str,
            _track_model: &ModelParams,
            _face_model: &ModelParams,
        ) -> vtrack_engine::EngineResult<Box<dyn vtrack_engine::TickStream>> {
            let ticks = self.ticks.lock().unwrap().take().unwrap_or_default();
            Ok(Box::new(OneShotStream { ticks: StdMutex::new(ticks) }))
        }
    }

    #[tokio::test]
    async fn single_detection_is_registered_as_a_new_track() {
        let tick = DetectionTick::new(
            FrameHandle::new(vec![0u8; 100 * 100 * 3], 100, 100),
            vec![vtrack_engine::Detection {
                xyxy: [10.0, 10.0, 60.0, 60.0],
                conf: Some(0.9),
                id: Some(7),
                cls: None,
                keypoints: Some(frontal_keypoints()),
            }],
        );
        let engine: Arc<dyn DetectionEngine> = Arc::new(OneShotEngine {
            ticks: StdMutex::new(Some(vec![tick])),
        });

        let registry = Arc::new(TrackRegistry::new());
        let queue = Arc::new(DispatchQueue::new(4));
        let finisher = Arc::new(FinishService::new(Arc::clone(&registry), queue));
        let config = Arc::new(AppConfig::for_test());
        let (_stop_tx, stop_rx) = watch::channel(false);

        let state = run(
            camera(),
            engine,
            ModelParams::default(),
            ModelParams::default(),
            Arc::clone(&registry),
            Arc::clone(&finisher),
            config,
            stop_rx,
        )
        .await;

        assert_eq!(state, PipelineState::Stopped);
        // the pipeline drains every open track on stream end, so the
        // best event is in the dispatch queue rather than the registry.
        assert!(registry.by_camera(CameraId::new(1).unwrap()).await.is_empty());
    }

    #[tokio::test]
    async fn detection_below_min_confidence_is_never_registered() {
        let tick = DetectionTick::new(
            FrameHandle::new(vec![0u8; 100 * 100 * 3], 100, 100),
            vec![vtrack_engine::Detection {
                xyxy: [10.0, 10.0, 60.0, 60.0],
                conf: Some(0.1),
                id: Some(7),
                cls: None,
                keypoints: None,
            }],
        );
        let engine: Arc<dyn DetectionEngine> = Arc::new(OneShotEngine {
            ticks: StdMutex::new(Some(vec![tick])),
        });

        let registry = Arc::new(TrackRegistry::new());
        let queue = Arc::new(DispatchQueue::new(4));
        let finisher = Arc::new(FinishService::new(Arc::clone(&registry), queue.clone()));
        let config = Arc::new(AppConfig::for_test());
        let (_stop_tx, stop_rx) = watch::channel(false);

        run(
            camera(),
            engine,
            ModelParams::default(),
            ModelParams::default(),
            Arc::clone(&registry),
            finisher,
            config,
            stop_rx,
        )
        .await;

        assert!(queue.is_empty().await);
    }

    #[test]
    fn track_id_zero_is_treated_as_unassigned() {
        assert!(TrackId::new(0).is_reserved());
    }
}
