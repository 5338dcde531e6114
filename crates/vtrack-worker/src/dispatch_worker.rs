//! Dispatch worker pool (C9, §4.8): drains the Dispatch Queue, applies
//! submission filters, and performs the synchronous backend RPC off
//! the inference thread.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use vtrack_backend_client::BackendClient;
use vtrack_models::Event;
use vtrack_tracking::DispatchQueue;

use crate::config::AppConfig;
use crate::logging::CameraLogger;

/// Runs `worker_count` dispatch workers until `stop` fires, draining
/// `queue` and submitting admitted events through `backend`. Each
/// camera's own `external_detector_token` (carried on its Frame)
/// authenticates its submissions, not a single process-wide token.
pub async fn run(
    queue: Arc<DispatchQueue>,
    backend: Arc<BackendClient>,
    config: Arc<AppConfig>,
    mut stop: watch::Receiver<bool>,
) {
    let worker_count = config.dispatch_worker_count();
    let timeout = Duration::from_secs(config.queues.timeout_secs.max(1));
    let min_box_area = config.filter.min_box_area;
    let min_box_conf = config.filter.min_box_conf;

    let mut workers = Vec::with_capacity(worker_count);
    for id in 0..worker_count {
        let queue = Arc::clone(&queue);
        let backend = Arc::clone(&backend);
        let mut stop = stop.clone();
        workers.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop.changed() => {
                        if *stop.borrow() {
                            break;
                        }
                    }
                    event = queue.get_with_timeout(timeout) => {
                        let Some(event) = event else { continue };
                        submit(id, event, &backend, min_box_area, min_box_conf).await;
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

async fn submit(worker_id: usize, event: Event, backend: &BackendClient, min_box_area: i64, min_box_conf: f64) {
    let camera_id = match event.frame() {
        Some(frame) => frame.camera.id.value(),
        None => {
            tracing::warn!(worker = worker_id, "dispatch worker dropped event with no frame");
            return;
        }
    };
    let logger = CameraLogger::with_track(camera_id, event.track_id.value());

    if event.bbox.area() < min_box_area || event.confidence.value() < min_box_conf || !event.has_movement {
        logger.warn("dispatch worker dropped event failing submission filters");
        return;
    }

    let token = event.frame().expect("checked above").camera.token.clone();

    match backend.add_face_event(&token, camera_id, &event).await {
        Ok(()) => logger.info("best event submitted to face-recognition backend"),
        Err(err) => {
            tracing::warn!(worker = worker_id, camera_id, error = %err, "backend submission failed");
        }
    }
}
