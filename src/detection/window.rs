//! Fixed-capacity window of recent upstream statuses.

use std::collections::VecDeque;

use crate::parser::is_server_error;

/// Holds the last `capacity` statuses in arrival order.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    capacity: usize,
    statuses: VecDeque<u16>,
}

impl SlidingWindow {
    /// Create an empty window. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            statuses: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a status, evicting the oldest when full.
    pub fn push(&mut self, status: u16) {
        if self.statuses.len() == self.capacity {
            self.statuses.pop_front();
        }
        self.statuses.push_back(status);
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.statuses.iter().copied()
    }

    /// Number of 5xx statuses currently held.
    pub fn error_count(&self) -> usize {
        self.iter().filter(|s| is_server_error(*s)).count()
    }
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new(200)
    }
}
