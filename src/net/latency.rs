//! Artificial latency: a delayed delivery queue
//!
//! Every message pushed through a [`DelayQueue`] becomes due a fixed delay
//! after it was pushed. The arena drains due entries from its event loop, so
//! ordering and cancellation can be exercised with explicit instants instead
//! of wall-clock sleeps.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use tokio::time::Instant;

use crate::game::world::PlayerId;

/// A message waiting for its delay to elapse
#[derive(Debug)]
pub struct Delivery<T> {
    pub due: Instant,
    pub session: PlayerId,
    pub payload: T,
    seq: u64,
}

impl<T> PartialEq for Delivery<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Delivery<T> {}

impl<T> PartialOrd for Delivery<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Delivery<T> {
    // Reversed so the max-heap yields the earliest (due, seq) first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Timer-indexed priority queue of pending deliveries
#[derive(Debug)]
pub struct DelayQueue<T> {
    delay: Duration,
    heap: BinaryHeap<Delivery<T>>,
    next_seq: u64,
}

impl<T> DelayQueue<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Queue a payload for `session`, due one delay after `now`
    pub fn push(&mut self, now: Instant, session: PlayerId, payload: T) -> Instant {
        let due = now + self.delay;
        self.heap.push(Delivery {
            due,
            session,
            payload,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        due
    }

    /// Earliest due instant, if anything is pending
    pub fn next_due(&self) -> Option<Instant> {
        self.heap.peek().map(|d| d.due)
    }

    /// Remove and return everything due at or before `now`, earliest first.
    /// Entries with equal due instants come out in submission order.
    pub fn pop_due(&mut self, now: Instant) -> Vec<Delivery<T>> {
        let mut ready = Vec::new();
        while self.heap.peek().is_some_and(|d| d.due <= now) {
            if let Some(delivery) = self.heap.pop() {
                ready.push(delivery);
            }
        }
        ready
    }

    /// Drop every pending entry addressed to `session`. Returns how many.
    pub fn cancel(&mut self, session: &PlayerId) -> usize {
        let before = self.heap.len();
        self.heap.retain(|d| &d.session != session);
        before - self.heap.len()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
