//! Append-only event log
//!
//! The log assigns sequence positions and fans events out to subscribers.
//! It is never rewritten: an appended event is visible to `events_since`
//! forever, which is what makes the log the system of record.

use crate::event::{EventKind, EventRecord};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use relief_core::{BountyId, EventSeq};
use tokio::sync::broadcast;

/// Ordered, append-only event log with push and poll observation
///
/// Writers append under the ledger's per-bounty serialization; the log's own
/// lock is always innermost, so sequence order agrees with mutation order.
/// Subscribers that lag past the channel capacity lose the oldest buffered
/// events and recover by polling `events_since` — they never block a writer.
pub struct EventLog {
    events: RwLock<Vec<EventRecord>>,
    publisher: broadcast::Sender<EventRecord>,
}

impl EventLog {
    /// Create an empty log with the given broadcast capacity
    pub fn new(channel_capacity: usize) -> Self {
        let (publisher, _) = broadcast::channel(channel_capacity.max(1));
        Self {
            events: RwLock::new(Vec::new()),
            publisher,
        }
    }

    /// Append one event, assigning the next sequence position
    pub fn append(&self, at: DateTime<Utc>, bounty: BountyId, kind: EventKind) -> EventRecord {
        let mut events = self.events.write();
        let record = EventRecord {
            seq: EventSeq::new(events.len() as u64),
            at,
            bounty,
            kind,
        };
        events.push(record.clone());
        // No receivers is fine; the log itself is the durable record.
        let _ = self.publisher.send(record.clone());
        record
    }

    /// All events at or after the given sequence position, in order
    pub fn events_since(&self, seq: EventSeq) -> Vec<EventRecord> {
        let events = self.events.read();
        let start = (seq.value() as usize).min(events.len());
        events[start..].to_vec()
    }

    /// The full ordered log
    pub fn all(&self) -> Vec<EventRecord> {
        self.events.read().clone()
    }

    /// Number of events appended so far
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Subscribe to events appended after this call
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.publisher.subscribe()
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("len", &self.len())
            .finish()
    }
}
