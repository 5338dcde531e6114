//! The control plane: configuration, logging, and the four long-running
//! components that drive the face-tracking core (`vtrack-tracking`)
//! from live camera feeds (`vtrack-engine`) to the face-recognition
//! backend (`vtrack-backend-client`).

pub mod camera_monitor;
pub mod config;
pub mod dispatch_worker;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod ttl_sweeper;

pub use config::AppConfig;
pub use error::{ConfigError, PipelineError, SupervisorError};
pub use logging::{init_tracing, CameraLogger};
pub use pipeline::PipelineState;
