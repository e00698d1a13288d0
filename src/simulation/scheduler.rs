//! Per-restaurant event calendar.
//!
//! The scheduler is a pure time-ordered queue. It never moves its own clock: the frame
//! tick of the owning restaurant calls [`DeliveryScheduler::advance`], then drains the
//! due events with [`DeliveryScheduler::next_frame`].

use crate::simulation::{DeliveryEvent, WorkflowId};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::trace;

/// Heap entry. Ordered so that the smallest `(due, seq)` pops first.
struct Scheduled {
    due: u64,
    seq: u64,
    event: DeliveryEvent,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
pub struct DeliveryScheduler {
    position: u64,
    next_seq: u64,
    queue: BinaryHeap<Scheduled>,
}

impl DeliveryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated clock value.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Moves the clock forward by one and returns the new position.
    pub fn advance(&mut self) -> u64 {
        self.position += 1;
        self.position
    }

    /// Moves the clock to `position`. The clock never runs backwards.
    pub fn advance_to(&mut self, position: u64) -> u64 {
        self.position = self.position.max(position);
        self.position
    }

    /// Adds `event` to the calendar. Events with equal due positions fire in the order
    /// they were enqueued.
    pub fn enqueue(&mut self, event: DeliveryEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        trace!(due = event.due, seq, position = self.position, "Enqueue");
        self.queue.push(Scheduled {
            due: event.due,
            seq,
            event,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Number of pending events that belong to `workflow`.
    pub fn pending_for(&self, workflow: WorkflowId) -> usize {
        self.queue
            .iter()
            .filter(|scheduled| scheduled.event.workflow == workflow)
            .count()
    }

    /// Removes and returns every event due at or before the current position, ordered
    /// by due position and then by enqueue order.
    pub fn next_frame(&mut self) -> Vec<DeliveryEvent> {
        let mut frame = Vec::new();
        while self
            .queue
            .peek()
            .is_some_and(|next| next.due <= self.position)
        {
            if let Some(scheduled) = self.queue.pop() {
                frame.push(scheduled.event);
            }
        }
        frame
    }
}
