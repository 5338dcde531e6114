//! Tracking core: the Track Registry, frontal-face scorer, dispatch
//! queue and finish service that sit between a camera's streaming
//! pipeline and the face-recognition backend client.

pub mod finish;
pub mod queue;
pub mod registry;
pub mod scorer;

pub use finish::{FinishReason, FinishService};
pub use queue::DispatchQueue;
pub use registry::TrackRegistry;
pub use scorer::frontal_face_score;
