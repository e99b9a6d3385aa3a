//! Fixed-capacity history buffers for motion tracking.

use std::collections::VecDeque;

/// Ring buffer keeping the most recent `capacity` samples.
///
/// Oldest samples are evicted first. The classifier feeds these as an
/// extension point for motion-based gestures; nothing consumes them yet.
#[derive(Clone, Debug)]
pub struct MotionHistory<T> {
    samples: VecDeque<T>,
    capacity: usize,
}

impl<T> MotionHistory<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be non-zero");
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, evicting the oldest once the buffer is full.
    pub fn push(&mut self, sample: T) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn latest(&self) -> Option<&T> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates samples oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.samples.iter()
    }
}
