//! Structured logging setup and camera/track-scoped logging helpers.

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::SupervisorError;

/// Installs the process-wide `tracing` subscriber: JSON output, level
/// from `logging.level` layered under `RUST_LOG`, and a non-blocking
/// queued writer so per-frame hot paths in C8 never block on file I/O
/// (§AMBIENT STACK "Logging").
///
/// `tracing-appender`'s rolling writer only rotates on a time boundary
/// (minutely/hourly/daily), not a byte-size threshold, so daily
/// rotation plus a retained-file count is the closest available policy
/// to `logging.rotation_count`; the file is rotated at local midnight
/// and only the newest `rotation_count` files are kept.
pub fn init_tracing(config: &LoggingConfig) -> Result<tracing_appender::non_blocking::WorkerGuard, SupervisorError> {
    let directory = std::path::Path::new(&config.file)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let prefix = std::path::Path::new(&config.file)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "vtrack.log".to_string());

    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix(prefix)
        .max_log_files(config.rotation_count.max(1) as usize)
        .build(directory)
        .map_err(|e| SupervisorError::Logging(e.to_string()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking::NonBlockingBuilder::default()
        .buffered_lines_limit(config.queue_size)
        .finish(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vtrack={}", config.level)));

    tracing_subscriber::registry()
        .with(fmt::layer().json().with_writer(non_blocking))
        .with(filter)
        .try_init()
        .map_err(|e| SupervisorError::Logging(e.to_string()))?;

    Ok(guard)
}

/// Logs camera- and track-scoped lifecycle events with consistent
/// structured fields, so operators can correlate across components
/// (§7 "User-visible behavior").
#[derive(Debug, Clone)]
pub struct CameraLogger {
    camera_id: i64,
    track_id: Option<i64>,
}

impl CameraLogger {
    pub fn new(camera_id: i64) -> Self {
        Self {
            camera_id,
            track_id: None,
        }
    }

    pub fn with_track(camera_id: i64, track_id: i64) -> Self {
        Self {
            camera_id,
            track_id: Some(track_id),
        }
    }

    pub fn info(&self, message: &str) {
        info!(camera_id = self.camera_id, track_id = self.track_id, "{}", message);
    }

    pub fn warn(&self, message: &str) {
        warn!(camera_id = self.camera_id, track_id = self.track_id, "{}", message);
    }

    pub fn error(&self, message: &str) {
        error!(camera_id = self.camera_id, track_id = self.track_id, "{}", message);
    }

    pub fn span(&self, operation: &'static str) -> Span {
        tracing::info_span!(
            "camera_pipeline",
            op = operation,
            camera_id = self.camera_id,
            track_id = self.track_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logger_without_track_reports_none() {
        let logger = CameraLogger::new(7);
        assert_eq!(logger.camera_id, 7);
        assert!(logger.track_id.is_none());
    }

    #[test]
    fn logger_with_track_carries_both_ids() {
        let logger = CameraLogger::with_track(7, 42);
        assert_eq!(logger.track_id, Some(42));
    }
}
