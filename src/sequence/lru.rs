//! LRU Tracker Module
//!
//! Tracks recency of memoized sequence lengths for eviction.

use std::collections::VecDeque;

// == LRU Tracker ==
/// Tracks access order of sequence lengths.
///
/// - Front = Most recently used
/// - Back = Least recently used
#[derive(Debug, Default)]
pub struct LruTracker {
    order: VecDeque<usize>,
}

impl LruTracker {
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Touch ==
    /// Marks a length as recently used, moving it to the front.
    pub fn touch(&mut self, n: usize) {
        self.remove(n);
        self.order.push_front(n);
    }

    pub fn remove(&mut self, n: usize) {
        if let Some(pos) = self.order.iter().position(|&k| k == n) {
            self.order.remove(pos);
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used length.
    pub fn evict_oldest(&mut self) -> Option<usize> {
        self.order.pop_back()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
