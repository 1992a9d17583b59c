//! Start events and the event queue.
//!
//! Only start events exist here — request arrivals pushed by the workload
//! producer, and tool starts pushed by the engine when a DAG node becomes
//! eligible.  Completions are synthesized by the completion search and never
//! stored, so the queue needs no removal by identity.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use fsim_core::{RequestId, SimTime};

// ── Event ─────────────────────────────────────────────────────────────────────

/// Payload of a start event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// A new request of the given type enters the system.
    RequestArrival { request_type: String },
    /// DAG node `node` of `request` becomes eligible and starts.
    ToolStart { request: RequestId, node: usize },
}

/// A timestamped start event.
#[derive(Clone, Debug)]
pub struct Event {
    pub time: SimTime,
    pub kind: EventKind,
}

impl Event {
    /// A request-arrival event, the only kind external producers push.
    pub fn arrival(time: SimTime, request_type: impl Into<String>) -> Self {
        Self {
            time,
            kind: EventKind::RequestArrival { request_type: request_type.into() },
        }
    }

    pub(crate) fn tool_start(time: SimTime, request: RequestId, node: usize) -> Self {
        Self { time, kind: EventKind::ToolStart { request, node } }
    }
}

// ── EventQueue ────────────────────────────────────────────────────────────────

/// Heap entry: ordered by timestamp, then by enqueue ordinal.
///
/// The ordinal makes equal-timestamp events pop in enqueue order, which is
/// what makes a run fully reproducible given an identical arrival sequence.
#[derive(Debug)]
struct QueueEntry {
    time: SimTime,
    seq:  u64,
    kind: EventKind,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Min-priority queue of start events keyed by `(timestamp, enqueue ordinal)`.
#[derive(Default)]
pub struct EventQueue {
    heap:     BinaryHeap<Reverse<QueueEntry>>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `event`, assigning it the next tiebreak ordinal.
    pub fn push(&mut self, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(QueueEntry { time: event.time, seq, kind: event.kind }));
    }

    /// Timestamp of the earliest event, or `None` if the queue is empty.
    pub fn peek_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|Reverse(entry)| entry.time)
    }

    /// Remove and return the earliest event.
    pub fn pop(&mut self) -> Option<Event> {
        self.heap
            .pop()
            .map(|Reverse(entry)| Event { time: entry.time, kind: entry.kind })
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
