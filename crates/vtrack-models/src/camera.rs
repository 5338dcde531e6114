//! Camera identity carried by every frame and event.

use crate::ids::CameraId;

/// A remote camera as known to the control plane: its id, its display
/// name, and the token the face-recognition backend expects when events
/// originating from it are submitted (§6.2, §6.3).
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub id: CameraId,
    pub name: String,
    pub token: String,
    pub rtsp_url: String,
    pub active: bool,
}
