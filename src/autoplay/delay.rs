//! Fixed-latency delay buffer between detection and actuation

use std::collections::VecDeque;

use super::events::LaneSet;

/// Bounded FIFO of per-frame firing sets.
///
/// One set goes in per processed frame. Once the buffer holds `capacity`
/// sets, [`pop_if_full`](Self::pop_if_full) evicts the oldest one, which is
/// the set to actuate now. A set pushed at frame `t` therefore leaves at
/// frame `t + capacity - 1`.
#[derive(Debug, Clone)]
pub struct DelayBuffer {
    sets: VecDeque<LaneSet>,
    capacity: usize,
}

impl DelayBuffer {
    /// Create a buffer holding `capacity` frames (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            sets: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.sets.len() >= self.capacity
    }

    /// Append this frame's firing set
    pub fn push(&mut self, set: LaneSet) {
        self.sets.push_back(set);
    }

    /// Remove and return the oldest set once the buffer is full
    pub fn pop_if_full(&mut self) -> Option<LaneSet> {
        if self.is_full() {
            self.sets.pop_front()
        } else {
            None
        }
    }

    /// Push a set and return the set due for actuation, if any
    pub fn advance(&mut self, set: LaneSet) -> Option<LaneSet> {
        self.push(set);
        self.pop_if_full()
    }
}
