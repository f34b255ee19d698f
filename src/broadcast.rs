//! Fan-out of committed seat changes to every connected observer.
//!
//! One `tokio::sync::broadcast` channel carries all days; observers filter by
//! `dayId` themselves. Publishing never waits on observers: a receiver that
//! falls behind loses the oldest events and is told to resync.
//!
//! Two handlers can commit changes to the same seat and then race each other
//! to publish. The broadcaster keeps the last published row version per seat
//! and drops anything older, so observers only ever move a seat forward.
//!
//! Each frame travels with the row versions it reflects. A connection that
//! already holds a newer snapshot of those seats skips it.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use crate::models::{Seat, SeatChange};

/// Server → client frames on the live channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum LiveEvent {
    SeatUpdated {
        id: i32,
        taken: bool,
        #[serde(rename = "dayId")]
        day_id: i32,
    },
    SeatsReset {
        #[serde(rename = "dayId")]
        day_id: i32,
    },
    /// Reply to `get-seats`, sent to the asking connection only.
    SeatsData {
        #[serde(rename = "dayId")]
        day_id: i32,
        seats: Vec<Seat>,
    },
    /// The observer missed `skipped` events and should refetch its day.
    Resync { skipped: u64 },
    Error { message: String },
}

/// One item on the channel: the frame and the `(seat_id, version)` pairs it
/// carries. Frames that are not seat changes carry no versions.
#[derive(Debug)]
pub struct Broadcast {
    pub event: LiveEvent,
    versions: Vec<(i32, i64)>,
}

impl Broadcast {
    /// True when `seen` already holds every seat of this frame at the same or
    /// a newer version, i.e. a snapshot has overtaken it.
    pub fn is_covered_by(&self, seen: &HashMap<i32, i64>) -> bool {
        !self.versions.is_empty()
            && self
                .versions
                .iter()
                .all(|(seat_id, version)| seen.get(seat_id).is_some_and(|held| held >= version))
    }

    pub fn record(&self, seen: &mut HashMap<i32, i64>) {
        for &(seat_id, version) in &self.versions {
            let held = seen.entry(seat_id).or_insert(version);
            *held = (*held).max(version);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Published {
    day_id: i32,
    taken: bool,
    version: i64,
}

#[derive(Clone)]
pub struct Broadcaster {
    sender: broadcast::Sender<Arc<Broadcast>>,
    published: Arc<Mutex<HashMap<i32, Published>>>,
}

impl Broadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            published: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Broadcast>> {
        self.sender.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Returns `false` when a newer state of the seat was already published.
    pub fn publish_seat_update(&self, change: SeatChange) -> bool {
        let mut published = self.published.lock();
        if let Some(last) = published.get(&change.seat_id) {
            if last.version >= change.version {
                debug!(
                    seat_id = change.seat_id,
                    version = change.version,
                    published_version = last.version,
                    "Dropping stale seat update"
                );
                return false;
            }
        }
        published.insert(
            change.seat_id,
            Published { day_id: change.day_id, taken: change.taken, version: change.version },
        );
        self.send(
            LiveEvent::SeatUpdated { id: change.seat_id, taken: change.taken, day_id: change.day_id },
            vec![(change.seat_id, change.version)],
        );
        true
    }

    /// `changes` are the rows the reset wrote. A toggle that committed after
    /// the reset may already be out; those seats are re-sent right after the
    /// reset so observers end on the newest state.
    pub fn publish_reset(&self, day_id: i32, changes: &[SeatChange]) {
        let mut published = self.published.lock();
        let mut newer = Vec::new();
        for change in changes {
            match published.get(&change.seat_id) {
                Some(last) if last.version > change.version => newer.push((change.seat_id, *last)),
                _ => {
                    published.insert(
                        change.seat_id,
                        Published { day_id, taken: false, version: change.version },
                    );
                }
            }
        }

        let versions = changes.iter().map(|c| (c.seat_id, c.version)).collect();
        self.send(LiveEvent::SeatsReset { day_id }, versions);
        // Observers may show these seats free for a moment before the repair lands
        for (seat_id, last) in newer {
            self.send(
                LiveEvent::SeatUpdated { id: seat_id, taken: last.taken, day_id: last.day_id },
                vec![(seat_id, last.version)],
            );
        }
    }

    fn send(&self, event: LiveEvent, versions: Vec<(i32, i64)>) {
        // Err means nobody is listening right now
        if self.sender.send(Arc::new(Broadcast { event, versions })).is_err() {
            debug!("No observers connected, event dropped");
        }
    }
}
