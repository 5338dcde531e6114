//! Per-subject track aggregate and its `add_event` algorithm (§4.2).

use crate::event::Event;
use crate::ids::TrackId;
use crate::timestamp::Timestamp;

/// Limits a Track enforces on itself; sourced from `track.*` config
/// (§6.4) and instantiated once per track by the streaming pipeline.
#[derive(Debug, Clone, Copy)]
pub struct TrackLimits {
    pub max_events: usize,
    pub min_movement_pixels: f64,
    pub lost_ttl: std::time::Duration,
    pub active_ttl: std::time::Duration,
}

/// Per-subject aggregate of detections over time.
///
/// Created on first detection, finalized by TTL or saturation. All
/// mutation goes through [`Track::add_event`]; no other component
/// mutates a Track's fields directly (§5).
#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    best_event: Option<Event>,
    last_event: Option<Event>,
    event_count: usize,
    movement_count: usize,
    started_at: Timestamp,
    last_seen_at: Option<Timestamp>,
    limits: TrackLimits,
}

impl Track {
    pub fn new(id: TrackId, limits: TrackLimits) -> Self {
        Self {
            id,
            best_event: None,
            last_event: None,
            event_count: 0,
            movement_count: 0,
            started_at: Timestamp::now(),
            last_seen_at: None,
            limits,
        }
    }

    pub fn best_event(&self) -> Option<&Event> {
        self.best_event.as_ref()
    }

    pub fn last_event(&self) -> Option<&Event> {
        self.last_event.as_ref()
    }

    pub fn event_count(&self) -> usize {
        self.event_count
    }

    pub fn movement_count(&self) -> usize {
        self.movement_count
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn last_seen_at(&self) -> Option<Timestamp> {
        self.last_seen_at
    }

    pub fn is_saturated(&self) -> bool {
        self.event_count >= self.limits.max_events
    }

    /// `true` iff this track has ever moved: a single event counts as
    /// "has movement" (nothing to compare against yet), otherwise it
    /// depends on whether any inter-event displacement exceeded the
    /// configured threshold (§3.2).
    pub fn has_movement(&self) -> bool {
        self.event_count == 1 || self.movement_count > 0
    }

    /// Append a detection to this track, following §4.2 exactly.
    ///
    /// Precondition: `event.track_id` is not the reserved `0` value —
    /// callers validate this before the track is looked up or created.
    pub fn add_event(&mut self, event: Event) {
        let event_timestamp = event
            .frame()
            .map(|f| f.captured_at)
            .unwrap_or_else(Timestamp::now);
        self.last_seen_at = Some(event_timestamp);

        if self.is_saturated() {
            return;
        }

        if self.event_count == 0 {
            self.event_count = 1;
            self.movement_count = 0;
            self.best_event = Some(event.clone());
            self.last_event = Some(event);
            return;
        }

        self.event_count += 1;

        if let Some(last) = &self.last_event {
            let distance = last.bbox.center_distance(&event.bbox);
            if distance > self.limits.min_movement_pixels {
                self.movement_count += 1;
            }
        }

        self.last_event = Some(event.clone());

        let new_quality = event.quality();
        let best_quality = self.best_event.as_ref().map(Event::quality).unwrap_or(f64::MIN);
        if new_quality > best_quality {
            if let Some(mut previous_best) = self.best_event.replace(event) {
                previous_best.release_frame();
            }
        }
    }
}
