//! Sequence reconciliation between a snapshot and the diff-depth stream.
//!
//! Implements the snapshot + diff protocol:
//!
//! 1. Deltas whose `last_update_id` is at or below the applied sequence are
//!    stale and dropped.
//! 2. A delta is ready when it covers the next update id
//!    (`first <= S + 1 <= last`).
//! 3. Anything starting past `S + 1` is a gap. It is buffered until a new
//!    snapshot arrives, then replayed in `first_update_id` order.

use std::collections::VecDeque;

use tracing::warn;

use crate::types::{DeltaEvent, UpdateId};

/// Default number of events held while waiting for a snapshot.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1000;

/// Classification of one delta relative to the applied sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Already represented in the current state
    Stale,
    /// Covers the next update id; apply it now
    Ready,
    /// Starts past the next update id; updates are missing
    Future,
}

/// Outcome of dropping stale events and ordering the rest for replay
#[derive(Debug, Default)]
pub struct Replay {
    /// Events to run through [`Sequencer::classify`] in order
    pub events: Vec<DeltaEvent>,
    /// Events dropped because the snapshot already covers them
    pub discarded: usize,
}

/// Tracks the last applied update id and holds out-of-sequence events.
///
/// The sequencer never mutates the book. Its caller applies `Ready` events
/// and calls [`advance`](Sequencer::advance) in the same exclusive section.
#[derive(Debug, Clone)]
pub struct Sequencer {
    last_applied: Option<UpdateId>,
    buffer: VecDeque<DeltaEvent>,
    capacity: usize,
    evicted: u64,
}

impl Sequencer {
    /// Create a sequencer with the given buffer capacity.
    ///
    /// A capacity of zero is treated as one so a gap event is never lost
    /// before the next snapshot is taken.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            last_applied: None,
            buffer: VecDeque::with_capacity(capacity.min(DEFAULT_BUFFER_CAPACITY)),
            capacity,
            evicted: 0,
        }
    }

    /// Last applied update id, `None` before the first snapshot
    #[must_use]
    pub const fn last_applied(&self) -> Option<UpdateId> {
        self.last_applied
    }

    /// Classify an event against the last applied update id.
    ///
    /// Without a snapshot every event is `Future`: nothing can be applied yet.
    #[must_use]
    pub fn classify(&self, first: UpdateId, last: UpdateId) -> Decision {
        let Some(applied) = self.last_applied else {
            return Decision::Future;
        };
        let next = applied.saturating_add(1);
        if last <= applied {
            Decision::Stale
        } else if first <= next {
            // last > applied, so last >= next
            Decision::Ready
        } else {
            Decision::Future
        }
    }

    /// Record that an event ending at `last` was applied
    pub fn advance(&mut self, last: UpdateId) {
        self.last_applied = Some(last);
    }

    /// Hold an event until the next snapshot.
    ///
    /// When the buffer is full the oldest delivered event is evicted and
    /// returned.
    pub fn buffer(&mut self, event: DeltaEvent) -> Option<DeltaEvent> {
        let evicted = if self.buffer.len() >= self.capacity {
            self.evicted += 1;
            self.buffer.pop_front()
        } else {
            None
        };
        if let Some(old) = &evicted {
            warn!(
                capacity = self.capacity,
                first_update_id = old.first_update_id,
                last_update_id = old.last_update_id,
                "Delta buffer full, evicting oldest event"
            );
        }
        self.buffer.push_back(event);
        evicted
    }

    /// Re-anchor on a snapshot taken at `snapshot_id`.
    ///
    /// Drops buffered events the snapshot already covers and hands back
    /// the rest sorted by `first_update_id`. The buffer is left empty.
    pub fn rebase(&mut self, snapshot_id: UpdateId) -> Replay {
        self.last_applied = Some(snapshot_id);

        let before = self.buffer.len();
        let mut events: Vec<DeltaEvent> = self
            .buffer
            .drain(..)
            .filter(|event| event.last_update_id > snapshot_id)
            .collect();
        // Stable: redeliveries keep their arrival order and fall out as stale
        events.sort_by_key(|event| event.first_update_id);

        Replay {
            discarded: before - events.len(),
            events,
        }
    }

    /// Put events back at the front of the buffer, keeping their order
    pub fn requeue(&mut self, events: impl DoubleEndedIterator<Item = DeltaEvent>) {
        for event in events.rev() {
            self.buffer.push_front(event);
        }
        while self.buffer.len() > self.capacity {
            self.evicted += 1;
            self.buffer.pop_front();
        }
    }

    /// Number of buffered events
    #[must_use]
    pub fn backlog(&self) -> usize {
        self.buffer.len()
    }

    /// Maximum number of buffered events
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total events evicted from a full buffer
    #[must_use]
    pub const fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Forget the applied sequence and every buffered event
    pub fn reset(&mut self) {
        self.last_applied = None;
        self.buffer.clear();
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}
