//! Camera monitor (C10, §4.9): periodically diffs the active camera
//! set against what is currently running and starts/stops streaming
//! pipelines (C8) in response.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use vtrack_backend_client::RegistryClient;
use vtrack_engine::{DetectionEngine, ModelParams};
use vtrack_models::{Camera, CameraId};
use vtrack_tracking::{FinishService, TrackRegistry};

use crate::config::AppConfig;
use crate::pipeline;

/// Bounded time a stopped pipeline is given to unwind before it is
/// abandoned (§4.9 step 3, §5 "Cancellation & timeouts").
const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

struct RunningPipeline {
    handle: JoinHandle<pipeline::PipelineState>,
    stop: watch::Sender<bool>,
}

/// Runs the monitor's control loop until `stop` fires: fetch the
/// registry's active cameras every `config.camera_monitor_interval`,
/// start pipelines for newly-active cameras, stop pipelines for
/// newly-inactive ones, and on exit stop and join everything still
/// running.
pub async fn run(
    registry_client: Arc<RegistryClient>,
    engine: Arc<dyn DetectionEngine>,
    track_model: ModelParams,
    face_model: ModelParams,
    registry: Arc<TrackRegistry>,
    finisher: Arc<FinishService>,
    config: Arc<AppConfig>,
    mut stop: watch::Receiver<bool>,
) {
    let mut running: HashMap<i64, RunningPipeline> = HashMap::new();
    let mut ticker = tokio::time::interval(config.camera_monitor_interval);
    ticker.tick().await; // first tick fires immediately; diff right away

    loop {
        tokio::select! {
            _ = stop.changed() => {
                if *stop.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                reconcile(
                    &registry_client,
                    &engine,
                    &track_model,
                    &face_model,
                    &registry,
                    &finisher,
                    &config,
                    &mut running,
                ).await;
            }
        }
    }

    tracing::info!("camera monitor stopping, shutting down {} pipelines", running.len());
    stop_all(running).await;
}

async fn reconcile(
    registry_client: &RegistryClient,
    engine: &Arc<dyn DetectionEngine>,
    track_model: &ModelParams,
    face_model: &ModelParams,
    registry: &Arc<TrackRegistry>,
    finisher: &Arc<FinishService>,
    config: &Arc<AppConfig>,
    running: &mut HashMap<i64, RunningPipeline>,
) {
    let cameras = match registry_client.fetch_cameras().await {
        Ok(cameras) => cameras,
        Err(err) => {
            tracing::warn!(error = %err, "camera monitor failed to fetch the fleet, keeping current pipelines");
            return;
        }
    };

    let active: HashMap<i64, Camera> = cameras.into_iter().filter(|c| c.active).map(|c| (c.id.value(), c)).collect();

    let newly_inactive: Vec<i64> = running.keys().copied().filter(|id| !active.contains_key(id)).collect();
    for camera_id in newly_inactive {
        if let Some(pipeline) = running.remove(&camera_id) {
            tracing::info!(camera_id, "camera no longer active, stopping its pipeline");
            stop_one(pipeline).await;
        }
    }

    for (camera_id, camera) in active {
        if running.contains_key(&camera_id) {
            continue;
        }
        tracing::info!(camera_id, "camera newly active, starting its pipeline");
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(pipeline::run(
            camera,
            Arc::clone(engine),
            track_model.clone(),
            face_model.clone(),
            Arc::clone(registry),
            Arc::clone(finisher),
            Arc::clone(config),
            stop_rx,
        ));
        running.insert(camera_id, RunningPipeline { handle, stop: stop_tx });
    }
}

async fn stop_one(pipeline: RunningPipeline) {
    let _ = pipeline.stop.send(true);
    if tokio::time::timeout(STOP_JOIN_TIMEOUT, pipeline.handle).await.is_err() {
        tracing::warn!("pipeline did not stop within the bounded timeout, abandoning it");
    }
}

async fn stop_all(running: HashMap<i64, RunningPipeline>) {
    for (camera_id, pipeline) in running {
        tracing::info!(camera_id, "joining pipeline on shutdown");
        stop_one(pipeline).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use vtrack_tracking::DispatchQueue;

    struct NeverOpensEngine;

    #[async_trait]
    impl DetectionEngine for NeverOpensEngine {
        async fn open(
            &self,
            _source_url: &str,
            _track_model: &ModelParams,
            _face_model: &ModelParams,
        ) -> vtrack_engine::EngineResult<Box<dyn vtrack_engine::TickStream>> {
            Err(vtrack_engine::EngineError::OpenFailed {
                source_url: _source_url.to_string(),
                message: "no real engine in this test".into(),
            })
        }
    }

    fn camera(id: i64, active: bool) -> Camera {
        Camera {
            id: CameraId::new(id).unwrap(),
            name: format!("cam-{id}"),
            token: "tok".into(),
            rtsp_url: "rtsp://x".into(),
            active,
        }
    }

    #[tokio::test]
    async fn reconcile_starts_pipelines_for_newly_active_cameras() {
        let engine: Arc<dyn DetectionEngine> = Arc::new(NeverOpensEngine);
        let registry = Arc::new(TrackRegistry::new());
        let queue = Arc::new(DispatchQueue::new(4));
        let finisher = Arc::new(FinishService::new(Arc::clone(&registry), queue));
        let config = Arc::new(AppConfig::for_test());

        let cameras = vec![camera(1, true), camera(2, false)];
        let mut running = HashMap::new();

        // mirrors reconcile's own active-filter step
        let active: HashMap<i64, Camera> =
            cameras.into_iter().filter(|c| c.active).map(|c| (c.id.value(), c)).collect();
        assert_eq!(active.len(), 1);
        assert!(active.contains_key(&1));

        for (camera_id, camera) in active {
            let (stop_tx, stop_rx) = watch::channel(false);
            let handle = tokio::spawn(pipeline::run(
                camera,
                Arc::clone(&engine),
                ModelParams::default(),
                ModelParams::default(),
                Arc::clone(&registry),
                Arc::clone(&finisher),
                Arc::clone(&config),
                stop_rx,
            ));
            running.insert(camera_id, RunningPipeline { handle, stop: stop_tx });
        }

        assert_eq!(running.len(), 1);
        stop_all(running).await;
    }
}
