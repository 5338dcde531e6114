//! The contract a streaming pipeline (C8) consumes from an inference
//! engine binding (§6.1). The engine itself — decoding an RTSP source
//! and running tracking/face models over it — is out of scope; this
//! crate only fixes the seam a real binding (ONNX, ultralytics-style,
//! or a test double) plugs into.

mod error;
mod tick;

pub use error::{EngineError, EngineResult};
pub use tick::{Detection, DetectionTick, RawKeypoint};

use async_trait::async_trait;

/// Opaque, backend-specific parameters for a tracking or face model,
/// carried without interpretation beyond the keys named in the
/// configuration surface (§6.4, §9 "dynamic config bundles").
#[derive(Debug, Clone, Default)]
pub struct ModelParams {
    pub backend: String,
    pub values: std::collections::HashMap<String, String>,
}

/// Produces a lazy, possibly-infinite sequence of detection ticks for
/// one camera's RTSP source. Implementations bind the tracking model
/// and the face model; the pipeline never constructs them directly.
#[async_trait]
pub trait DetectionEngine: Send + Sync {
    /// Open a tick stream for `source_url`, configured with the
    /// tracking-model and face-model parameter bundles.
    async fn open(
        &self,
        source_url: &str,
        track_model: &ModelParams,
        face_model: &ModelParams,
    ) -> EngineResult<Box<dyn TickStream>>;
}

/// A per-camera stream of detection ticks, owning whatever model
/// handles the engine allocated in `DetectionEngine::open`.
#[async_trait]
pub trait TickStream: Send {
    /// Pull the next tick. `Ok(None)` signals clean termination of the
    /// underlying stream (§4.7 step 4: release both model handles).
    async fn next_tick(&mut self) -> EngineResult<Option<DetectionTick>>;
}
