//! Process entry point (C11, §6.5): wires the Track Registry, Dispatch
//! Queue, Finish Service, external-collaborator clients and the four
//! long-running control-plane components together, then owns ordered
//! startup and shutdown.

use std::sync::Arc;

use tokio::sync::watch;
use vtrack_backend_client::{BackendClient, RegistryClient};
use vtrack_engine::{DetectionEngine, EngineError, EngineResult, ModelParams, TickStream};
use vtrack_tracking::{DispatchQueue, FinishService, TrackRegistry};
use vtrack_worker::{camera_monitor, dispatch_worker, ttl_sweeper, AppConfig};

/// The inference engine is an out-of-scope external collaborator
/// (spec §1, §6.1): the control plane only needs something behind
/// `DetectionEngine`. Until a real binding (ONNX, an ultralytics-style
/// subprocess, ...) is wired in here, every camera's pipeline fails to
/// open its stream and the monitor logs the failure and retries on the
/// next reconcile tick rather than crashing the process.
struct UnboundEngine;

#[async_trait::async_trait]
impl DetectionEngine for UnboundEngine {
    async fn open(
        &self,
        source_url: &str,
        _track_model: &ModelParams,
        _face_model: &ModelParams,
    ) -> EngineResult<Box<dyn TickStream>> {
        Err(EngineError::OpenFailed {
            source_url: source_url.to_string(),
            message: "no inference engine binding configured".to_string(),
        })
    }
}

#[tokio::main]
async fn main() {
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        eprintln!("failed to install the default TLS crypto provider");
        std::process::exit(1);
    }

    let config = match AppConfig::load() {
        Ok(config) => Arc::new(config),
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    let _log_guard = match vtrack_worker::init_tracing(&config.logging) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("failed to initialize logging: {err}");
            std::process::exit(1);
        }
    };

    tracing::info!("vtrack supervisor starting");

    let registry = Arc::new(TrackRegistry::new());
    let queue = Arc::new(DispatchQueue::new(config.queues.best_event_queue_maxsize));
    let finisher = Arc::new(FinishService::new(Arc::clone(&registry), Arc::clone(&queue)));

    let http = reqwest::Client::new();
    let registry_client = Arc::new(RegistryClient::new(
        http.clone(),
        config.findface_credentials.url.clone(),
        config.findface.camera_group_prefix.clone(),
    ));
    let backend = Arc::new(BackendClient::new(
        http,
        config.findface_credentials.url.clone(),
        config.findface.jpeg_quality,
    ));

    let engine: Arc<dyn DetectionEngine> = Arc::new(UnboundEngine);
    let track_model = ModelParams {
        backend: config.track_model.backend.clone(),
        values: config.track_model.params.clone(),
    };
    let face_model = ModelParams {
        backend: config.face_model.backend.clone(),
        values: config.face_model.params.clone(),
    };

    let (stop_tx, stop_rx) = watch::channel(false);

    let sweeper = tokio::spawn(ttl_sweeper::run(
        Arc::clone(&registry),
        Arc::clone(&finisher),
        Arc::clone(&config),
        stop_rx.clone(),
    ));
    let dispatcher = tokio::spawn(dispatch_worker::run(
        Arc::clone(&queue),
        Arc::clone(&backend),
        Arc::clone(&config),
        stop_rx.clone(),
    ));
    let monitor = tokio::spawn(camera_monitor::run(
        Arc::clone(&registry_client),
        engine,
        track_model,
        face_model,
        Arc::clone(&registry),
        Arc::clone(&finisher),
        Arc::clone(&config),
        stop_rx,
    ));

    tracing::info!("vtrack supervisor running, press Ctrl+C to stop");
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");

    let _ = stop_tx.send(true);
    let _ = tokio::join!(sweeper, dispatcher, monitor);

    tracing::info!("vtrack supervisor stopped cleanly");
}
