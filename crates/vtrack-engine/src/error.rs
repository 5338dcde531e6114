//! Inference-engine error type (§7: `InferenceError`).

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to open source {source_url}: {message}")]
    OpenFailed { source_url: String, message: String },

    #[error("engine produced no further ticks: {0}")]
    StreamEnded(String),

    #[error("model backend error: {0}")]
    Model(String),
}
