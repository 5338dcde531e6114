//! Error types for the backend and registry clients (§7).

use thiserror::Error;

pub type BackendResult<T> = Result<T, BackendError>;
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Failure submitting a face event to the backend (§7 `BackendSubmitError`).
/// The caller logs `message` and discards the event; there is no retry.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("jpeg encoding failed: {0}")]
    Encode(#[from] vtrack_models::ValidationError),

    #[error("{0}")]
    Submit(String),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("request to camera registry failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response shape from camera registry: {0}")]
    Decode(String),
}
