//! Value types and entities shared across the face-tracking control plane.
//!
//! This crate provides:
//! - Validated identifiers and value types: [`CameraId`], [`TrackId`],
//!   [`Bbox`], [`Confidence`], [`FaceLandmarks`], [`Timestamp`].
//! - The opaque, shareable image buffer ([`FrameHandle`]).
//! - The [`Frame`], [`Event`] and [`Track`] entities, including the
//!   `Track::add_event` aggregation algorithm.

pub mod bbox;
pub mod camera;
pub mod confidence;
pub mod error;
pub mod event;
pub mod frame;
pub mod frame_handle;
pub mod ids;
pub mod landmarks;
pub mod timestamp;
pub mod track;

pub use bbox::Bbox;
pub use camera::Camera;
pub use confidence::Confidence;
pub use error::{ValidationError, ValidationResult};
pub use event::Event;
pub use frame::Frame;
pub use frame_handle::FrameHandle;
pub use ids::{CameraId, TrackId};
pub use landmarks::{FaceLandmarks, Keypoint};
pub use timestamp::Timestamp;
pub use track::{Track, TrackLimits};
