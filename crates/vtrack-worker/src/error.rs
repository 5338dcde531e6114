//! Error taxonomy for the control plane (§7).

use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;
pub type PipelineResult<T> = Result<T, PipelineError>;
pub type SupervisorResult<T> = Result<T, SupervisorError>;

/// Fatal at startup; propagates out of `main` (§7, §6.5).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(String),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// A per-camera streaming pipeline's non-fatal failures (§7
/// `InferenceError`). The pipeline transitions to `Stopped` and
/// releases its models; it does not crash the process or other
/// cameras' pipelines.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("inference engine error: {0}")]
    Engine(#[from] vtrack_engine::EngineError),

    #[error("validation error: {0}")]
    Validation(#[from] vtrack_models::ValidationError),
}

/// Startup-wiring failures that propagate to the supervisor and cause
/// a non-zero exit (§6.5).
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}
