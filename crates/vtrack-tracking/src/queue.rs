//! Dispatch Queue (C5, §4.4): a bounded, multi-producer multi-consumer
//! queue of the best [`Event`] chosen for each finished track.
//!
//! Producers (the finish service) never block: a full queue drops the
//! incoming event and logs a warning rather than stalling the
//! streaming pipeline that produced it. Consumers (the dispatch worker
//! pool) wait with a timeout so they can observe shutdown signals
//! between polls.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tracing::warn;
use vtrack_models::Event;

/// Thread-safe, bounded FIFO of best-events awaiting submission to the
/// face-recognition backend.
pub struct DispatchQueue {
    capacity: usize,
    items: Mutex<VecDeque<Event>>,
    notify: Notify,
}

impl DispatchQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            notify: Notify::new(),
        }
    }

    /// Enqueue without blocking. Returns `false` (and logs a warning)
    /// if the queue was already at capacity; the event's Frame
    /// reference is released before it is dropped, matching the
    /// best-effort delivery policy of §4.4/§4.5/§7.
    pub async fn try_put(&self, mut event: Event) -> bool {
        let mut items = self.items.lock().await;
        if items.len() >= self.capacity {
            warn!(
                queue_size = items.len(),
                capacity = self.capacity,
                "dispatch queue full, dropping best event"
            );
            event.release_frame();
            return false;
        }
        items.push_back(event);
        drop(items);
        self.notify.notify_one();
        true
    }

    /// Wait up to `timeout` for an event, returning `None` on timeout
    /// so a polling worker can re-check its shutdown signal.
    pub async fn get_with_timeout(&self, timeout: Duration) -> Option<Event> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            {
                let mut items = self.items.lock().await;
                if let Some(event) = items.pop_front() {
                    return Some(event);
                }
            }
            let now = tokio::time::Instant::now();
            if now >= deadline {
                return None;
            }
            let remaining = deadline - now;
            let notified = self.notify.notified();
            if tokio::time::timeout(remaining, notified).await.is_err() {
                return None;
            }
        }
    }

    pub async fn size(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_full(&self) -> bool {
        self.items.lock().await.len() >= self.capacity
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
