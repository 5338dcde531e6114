//! Finish Service (C6, §4.5): ends a track's lifecycle and forwards
//! its best event to the dispatch queue.

use tokio::sync::Mutex;
use tracing::{info, warn};
use vtrack_models::{CameraId, TrackId};

use crate::queue::DispatchQueue;
use crate::registry::TrackRegistry;

/// Why a track's lifecycle ended. Logged at the finish site instead of
/// carried as a free-text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// No detection for longer than `track.lost_ttl` (§4.6).
    LostTtl,
    /// Continuously tracked past `track.active_ttl` (§4.6).
    ActiveTtl,
    /// `Track::is_saturated` reached `max_events` (§4.2 step 2).
    Saturation,
    /// The owning camera was stopped by the camera monitor (§4.9).
    CameraStopped,
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FinishReason::LostTtl => "lost_ttl",
            FinishReason::ActiveTtl => "active_ttl",
            FinishReason::Saturation => "saturation",
            FinishReason::CameraStopped => "camera_stopped",
        };
        f.write_str(s)
    }
}

/// Ends tracks: pulls the track out of the registry and its best event
/// into the dispatch queue, as a single unit as seen by any other
/// caller trying to finish the same `(camera, track_id)` concurrently.
pub struct FinishService {
    registry: std::sync::Arc<TrackRegistry>,
    queue: std::sync::Arc<DispatchQueue>,
    lock: Mutex<()>,
}

impl FinishService {
    pub fn new(registry: std::sync::Arc<TrackRegistry>, queue: std::sync::Arc<DispatchQueue>) -> Self {
        Self {
            registry,
            queue,
            lock: Mutex::new(()),
        }
    }

    /// The same lock that serializes `finish`'s get+remove, exposed so
    /// the streaming pipeline's get-or-create-then-`add_event` sequence
    /// (§4.7 step 3) can run under it too — both are "the external lock"
    /// of §4.1/§5 on a given `(camera, track_id)`.
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    /// Finish `(camera, track_id)`. A no-op if the track is already
    /// gone (another finisher raced ahead, or it was never
    /// registered) — finishing is idempotent.
    pub async fn finish(&self, camera: CameraId, track_id: TrackId, reason: FinishReason) {
        let track = {
            // Serializes the get+remove pair against concurrent finishers
            // racing the same track (e.g. TTL sweeper vs. saturation).
            let _guard = self.lock.lock().await;
            let track = self.registry.get(camera, track_id).await;
            if track.is_some() {
                self.registry.remove(camera, track_id).await;
            }
            track
        };

        let Some(track) = track else {
            return;
        };

        let Some(mut best_event) = track.best_event().cloned() else {
            info!(camera_id = %camera, track_id = %track_id, %reason, "track finished with no best event");
            return;
        };

        best_event.has_movement = track.has_movement();

        if !self.queue.try_put(best_event).await {
            warn!(
                camera_id = %camera,
                track_id = %track_id,
                %reason,
                "dispatch queue full, best event dropped"
            );
            return;
        }

        info!(camera_id = %camera, track_id = %track_id, %reason, "track finished");
    }
}
