//! Track Registry (C2): a concurrent map indexed by (CameraId, TrackId).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use vtrack_models::{CameraId, Track, TrackId};

type CameraTracks = HashMap<i64, Track>;

/// Concurrent lookup of Tracks by `(CameraId, TrackId)`.
///
/// Each operation below is individually atomic: a `RwLock` per camera
/// bucket lets independent cameras make progress concurrently while
/// within one camera, readers (TTL sweeper, `by_camera` snapshots) and
/// writers (the streaming pipeline, the finish service) serialize
/// correctly. Compound operations such as "get-and-remove" are
/// deliberately not exposed here — they belong to the finish service,
/// which wraps them in its own mutex (§4.1, §4.5).
#[derive(Default)]
pub struct TrackRegistry {
    cameras: RwLock<HashMap<i64, Arc<RwLock<CameraTracks>>>>,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    async fn bucket(&self, camera: CameraId) -> Arc<RwLock<CameraTracks>> {
        if let Some(bucket) = self.cameras.read().await.get(&camera.value()) {
            return Arc::clone(bucket);
        }
        let mut cameras = self.cameras.write().await;
        Arc::clone(
            cameras
                .entry(camera.value())
                .or_insert_with(|| Arc::new(RwLock::new(HashMap::new()))),
        )
    }

    /// Insert or overwrite the track at `(camera, track_id)`.
    pub async fn register(&self, camera: CameraId, track_id: TrackId, track: Track) {
        let bucket = self.bucket(camera).await;
        bucket.write().await.insert(track_id.value(), track);
    }

    /// `O(1)` lookup; absent returns `None`.
    pub async fn get(&self, camera: CameraId, track_id: TrackId) -> Option<Track> {
        let cameras = self.cameras.read().await;
        let bucket = cameras.get(&camera.value())?;
        let result = bucket.read().await.get(&track_id.value()).cloned();
        result
    }

    /// Idempotent; no error if the key is missing.
    pub async fn remove(&self, camera: CameraId, track_id: TrackId) -> Option<Track> {
        let cameras = self.cameras.read().await;
        let bucket = cameras.get(&camera.value())?;
        let result = bucket.write().await.remove(&track_id.value());
        result
    }

    /// Remove every track belonging to `camera`.
    pub async fn clear_camera(&self, camera: CameraId) {
        if let Some(bucket) = self.cameras.read().await.get(&camera.value()) {
            bucket.write().await.clear();
        }
    }

    /// A snapshot of the track ids currently registered for `camera`,
    /// safe against concurrent mutation (the caller iterates the
    /// snapshot, not the live map).
    pub async fn track_ids(&self, camera: CameraId) -> Vec<TrackId> {
        let cameras = self.cameras.read().await;
        match cameras.get(&camera.value()) {
            Some(bucket) => bucket
                .read()
                .await
                .keys()
                .copied()
                .map(TrackId::new)
                .collect(),
            None => Vec::new(),
        }
    }

    /// A snapshot of every Track registered for `camera`.
    pub async fn by_camera(&self, camera: CameraId) -> Vec<Track> {
        let cameras = self.cameras.read().await;
        match cameras.get(&camera.value()) {
            Some(bucket) => bucket.read().await.values().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// A snapshot of every camera id currently holding at least one
    /// bucket (including empty ones left behind by `clear_camera`).
    pub async fn camera_ids(&self) -> Vec<CameraId> {
        self.cameras
            .read()
            .await
            .keys()
            .copied()
            .filter_map(|id| CameraId::new(id).ok())
            .collect()
    }

    /// Track counts per camera, for observability.
    pub async fn stats(&self) -> HashMap<i64, usize> {
        let cameras = self.cameras.read().await;
        let mut out = HashMap::with_capacity(cameras.len());
        for (camera_id, bucket) in cameras.iter() {
            out.insert(*camera_id, bucket.read().await.len());
        }
        out
    }
}
