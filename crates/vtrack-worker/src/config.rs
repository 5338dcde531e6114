//! Layered application configuration (§6.4): built-in defaults →
//! optional `config.yaml`/`config.toml` → `VTRACK_`-prefixed
//! environment variables, loaded through the `config` crate.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub backend: String,
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: String::new(),
            params: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub min_box_area: i64,
    pub min_box_conf: f64,
    pub min_movement_pixels: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_box_area: 1000,
            min_box_conf: 0.5,
            min_movement_pixels: 2.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub min_movement_pixels: f64,
    pub lost_ttl_secs: u64,
    pub active_ttl_secs: u64,
    pub max_events: usize,
    /// How often each TTL sweeper worker scans the registry (§4.6 step 1).
    pub sweep_interval_secs: u64,
}

impl TrackConfig {
    pub fn lost_ttl(&self) -> Duration {
        Duration::from_secs(self.lost_ttl_secs)
    }

    pub fn active_ttl(&self) -> Duration {
        Duration::from_secs(self.active_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            min_movement_pixels: 2.0,
            lost_ttl_secs: 3,
            active_ttl_secs: 30,
            max_events: 50,
            sweep_interval_secs: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueuesConfig {
    pub best_event_queue_maxsize: usize,
    /// `0` = auto (`max(8, 2 * cores)`, §4.8).
    pub workers: usize,
    pub timeout_secs: u64,
}

impl Default for QueuesConfig {
    fn default() -> Self {
        Self {
            best_event_queue_maxsize: 1000,
            workers: 0,
            timeout_secs: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub skip_frames: u32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self { skip_frames: 0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FindfaceFileConfig {
    pub jpeg_quality: u8,
    pub camera_group_prefix: String,
}

impl Default for FindfaceFileConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 95,
            camera_group_prefix: "TESTE".to_string(),
        }
    }
}

/// Credentials, sourced only from the environment, never the file
/// (§6.4 "External credentials").
#[derive(Debug, Clone)]
pub struct FindfaceCredentials {
    pub url: String,
    pub user: String,
    pub password: String,
    pub uuid: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: String,
    pub level: String,
    /// Number of daily log files `logging.rs` keeps before pruning the
    /// oldest (`tracing_appender`'s rolling writer rotates on a time
    /// boundary, not a byte-size threshold).
    pub rotation_count: u32,
    pub queue_size: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "vtrack.log".to_string(),
            level: "info".to_string(),
            rotation_count: 5,
            queue_size: 4096,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub track_model: ModelConfig,
    pub face_model: ModelConfig,
    pub filter: FilterConfig,
    pub track: TrackConfig,
    pub queues: QueuesConfig,
    pub performance: PerformanceConfig,
    pub findface: FindfaceFileConfig,
    pub logging: LoggingConfig,
    /// How often the camera monitor (C10) re-diffs the registry.
    pub camera_monitor_interval_secs: u64,
}

/// The fully resolved application configuration: the file/defaults
/// layer plus environment-only credentials.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub track_model: ModelConfig,
    pub face_model: ModelConfig,
    pub filter: FilterConfig,
    pub track: TrackConfig,
    pub queues: QueuesConfig,
    pub performance: PerformanceConfig,
    pub findface: FindfaceFileConfig,
    pub findface_credentials: FindfaceCredentials,
    pub logging: LoggingConfig,
    pub camera_monitor_interval: Duration,
}

impl AppConfig {
    /// Layer defaults → optional config file → `VTRACK_`-prefixed env
    /// vars, then read mandatory credentials straight from the
    /// environment. A missing credential is a fatal `ConfigError`
    /// (§6.4, §6.5).
    pub fn load() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("VTRACK")
                    .separator("__")
                    .try_parsing(true),
            );

        let file: FileConfig = builder
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        let findface_credentials = FindfaceCredentials {
            url: required_env("FINDFACE_URL")?,
            user: required_env("FINDFACE_USER")?,
            password: required_env("FINDFACE_PASSWORD")?,
            uuid: required_env("FINDFACE_UUID")?,
        };

        Ok(Self {
            track_model: file.track_model,
            face_model: file.face_model,
            filter: file.filter,
            track: file.track,
            queues: file.queues,
            performance: file.performance,
            findface: file.findface,
            findface_credentials,
            logging: file.logging,
            camera_monitor_interval: Duration::from_secs(
                if file.camera_monitor_interval_secs == 0 {
                    10
                } else {
                    file.camera_monitor_interval_secs
                },
            ),
        })
    }

    /// Dispatch worker count, applying the `0 = auto` rule of §6.4/§4.8.
    pub fn dispatch_worker_count(&self) -> usize {
        if self.queues.workers > 0 {
            self.queues.workers
        } else {
            std::cmp::max(8, 2 * num_cpus())
        }
    }

    /// TTL sweeper worker count, `max(1, cores/4)` (§4.6).
    pub fn ttl_sweeper_count(&self) -> usize {
        std::cmp::max(1, num_cpus() / 4)
    }
}

fn required_env(key: &str) -> ConfigResult<String> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
impl AppConfig {
    /// An `AppConfig` with all-defaults and dummy credentials, for unit
    /// tests that need a config but not real `FINDFACE_*` env vars.
    pub fn for_test() -> Self {
        Self {
            track_model: ModelConfig::default(),
            face_model: ModelConfig::default(),
            filter: FilterConfig::default(),
            track: TrackConfig::default(),
            queues: QueuesConfig::default(),
            performance: PerformanceConfig::default(),
            findface: FindfaceFileConfig::default(),
            findface_credentials: FindfaceCredentials {
                url: "http://findface.test".into(),
                user: "user".into(),
                password: "password".into(),
                uuid: "uuid".into(),
            },
            logging: LoggingConfig::default(),
            camera_monitor_interval: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_worker_count_defaults_to_auto_formula() {
        let mut config = AppConfig::for_test();
        assert_eq!(config.dispatch_worker_count(), std::cmp::max(8, 2 * num_cpus()));
        config.queues.workers = 3;
        assert_eq!(config.dispatch_worker_count(), 3);
    }

    #[test]
    fn ttl_sweeper_count_is_at_least_one() {
        let config = AppConfig::for_test();
        assert!(config.ttl_sweeper_count() >= 1);
    }
}
