//! TTL sweeper pool (C7, §4.6): periodically scans the registry and
//! finishes tracks that have been idle or alive too long.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use vtrack_models::Timestamp;
use vtrack_tracking::{FinishReason, FinishService, TrackRegistry};

use crate::config::AppConfig;

/// Spawns `config.ttl_sweeper_count()` workers, each looping on
/// `sweep_interval` until `stop` fires. Exceptions inside one sweep
/// iteration are swallowed per §7 `TransientSweepError`: a panic in one
/// camera's track never stops the sweep of the others.
pub async fn run(
    registry: Arc<TrackRegistry>,
    finisher: Arc<FinishService>,
    config: Arc<AppConfig>,
    mut stop: watch::Receiver<bool>,
) {
    let worker_count = config.ttl_sweeper_count();
    let interval = config.track.sweep_interval();
    let lost_ttl = config.track.lost_ttl();
    let active_ttl = config.track.active_ttl();

    let mut workers = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let registry = Arc::clone(&registry);
        let finisher = Arc::clone(&finisher);
        let mut stop = stop.clone();
        workers.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop.changed() => {
                        if *stop.borrow() {
                            break;
                        }
                    }
                    _ = tokio::time::sleep(interval) => {
                        sweep_once(&registry, &finisher, lost_ttl, active_ttl).await;
                    }
                }
            }
        }));
    }

    let _ = stop.changed().await;
    for worker in workers {
        let _ = worker.await;
    }
}

async fn sweep_once(
    registry: &TrackRegistry,
    finisher: &FinishService,
    lost_ttl: Duration,
    active_ttl: Duration,
) {
    let now = Timestamp::now();
    for camera in registry.camera_ids().await {
        for track_id in registry.track_ids(camera).await {
            let Some(track) = registry.get(camera, track_id).await else {
                continue;
            };

            let Some(last_seen_at) = track.last_seen_at() else {
                continue;
            };
            let time_inactive = last_seen_at.elapsed_until(now);
            let time_alive = track.started_at().elapsed_until(now);

            if time_inactive > lost_ttl {
                finisher.finish(camera, track_id, FinishReason::LostTtl).await;
            } else if time_alive > active_ttl {
                finisher.finish(camera, track_id, FinishReason::ActiveTtl).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vtrack_models::{Bbox, Camera, CameraId, Confidence, Event, Frame, FrameHandle, Track, TrackId, TrackLimits};
    use vtrack_tracking::DispatchQueue;

    fn event_for(track_id: TrackId) -> Event {
        let frame = Arc::new(Frame::new(
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
        ));
        Event::new(
            frame,
            Bbox::new(0, 0, 10, 10).unwrap(),
            Confidence::new(0.9).unwrap(),
            None,
            track_id,
            None,
            None,
        )
    }

    #[tokio::test]
    async fn sweep_finishes_track_past_lost_ttl() {
        let registry = Arc::new(TrackRegistry::new());
        let queue = Arc::new(DispatchQueue::new(4));
        let finisher = Arc::new(FinishService::new(Arc::clone(&registry), queue));

        let camera = CameraId::new(1).unwrap();
        let track_id = TrackId::new(1);
        let limits = TrackLimits {
            max_events: 10,
            min_movement_pixels: 2.0,
            lost_ttl: Duration::from_millis(10),
            active_ttl: Duration::from_secs(300),
        };
        let mut track = Track::new(track_id, limits);
        track.add_event(event_for(track_id));
        registry.register(camera, track_id, track).await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        sweep_once(&registry, &finisher, Duration::from_millis(10), Duration::from_secs(300)).await;

        assert!(registry.get(camera, track_id).await.is_none());
    }

    #[tokio::test]
    async fn sweep_finishes_track_past_active_ttl_even_when_still_seen() {
        let registry = Arc::new(TrackRegistry::new());
        let queue = Arc::new(DispatchQueue::new(4));
        let finisher = Arc::new(FinishService::new(Arc::clone(&registry), queue));

        let camera = CameraId::new(1).unwrap();
        let track_id = TrackId::new(1);
        let limits = TrackLimits {
            max_events: 10,
            min_movement_pixels: 2.0,
            // lost_ttl is wide open so only active_ttl can trigger here.
            lost_ttl: Duration::from_secs(300),
            active_ttl: Duration::from_millis(10),
        };
        let mut track = Track::new(track_id, limits);
        track.add_event(event_for(track_id));
        registry.register(camera, track_id, track).await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        // last_seen_at is refreshed just before the sweep, as if the
        // camera were still continuously detecting this subject.
        let mut track = registry.get(camera, track_id).await.unwrap();
        track.add_event(event_for(track_id));
        registry.register(camera, track_id, track).await;

        sweep_once(&registry, &finisher, Duration::from_secs(300), Duration::from_millis(10)).await;

        assert!(registry.get(camera, track_id).await.is_none());
    }

    #[tokio::test]
    async fn sweep_leaves_fresh_track_alone() {
        let registry = Arc::new(TrackRegistry::new());
        let queue = Arc::new(DispatchQueue::new(4));
        let finisher = Arc::new(FinishService::new(Arc::clone(&registry), queue));

        let camera = CameraId::new(1).unwrap();
        let track_id = TrackId::new(1);
        let limits = TrackLimits {
            max_events: 10,
            min_movement_pixels: 2.0,
            lost_ttl: Duration::from_secs(300),
            active_ttl: Duration::from_secs(300),
        };
        let mut track = Track::new(track_id, limits);
        track.add_event(event_for(track_id));
        registry.register(camera, track_id, track).await;

        sweep_once(&registry, &finisher, Duration::from_secs(300), Duration::from_secs(300)).await;

        assert!(registry.get(camera, track_id).await.is_some());
    }
}
