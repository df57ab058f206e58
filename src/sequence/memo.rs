//! In-Process Memo
//!
//! Capacity-bounded map from sequence length to sequence, evicting the least recently used
//! entry once full. Callers wrap it in a lock; it does no synchronization of its own.

use std::collections::HashMap;

use crate::sequence::fib::Sequence;
use crate::sequence::lru::LruTracker;

// == Sequence Memo ==
#[derive(Debug)]
pub struct SequenceMemo {
    entries: HashMap<usize, Sequence>,
    lru: LruTracker,
    capacity: usize,
    evictions: u64,
}

impl SequenceMemo {
    /// Creates an empty memo. A capacity of zero disables memoization.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            capacity,
            evictions: 0,
        }
    }

    // == Get ==
    /// Returns a copy of the sequence of length `n` and marks it recently used.
    pub fn get(&mut self, n: usize) -> Option<Sequence> {
        let seq = self.entries.get(&n)?.clone();
        self.lru.touch(n);
        Some(seq)
    }

    // == Insert ==
    /// Stores a sequence, evicting the least recently used entry when at capacity.
    ///
    /// Re-inserting an existing length only refreshes its recency; the content is
    /// deterministic so there is nothing to overwrite.
    pub fn insert(&mut self, n: usize, seq: Sequence) {
        if self.capacity == 0 {
            return;
        }

        if self.entries.contains_key(&n) {
            self.lru.touch(n);
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                self.evictions += 1;
            }
        }

        self.entries.insert(n, seq);
        self.lru.touch(n);
    }

    // == Longest Prefix ==
    /// Finds the longest memoized sequence in `[floor, n)`.
    ///
    /// Does not affect recency: the caller only borrows it as a starting point.
    pub fn longest_below(&self, n: usize, floor: usize) -> Option<(usize, Sequence)> {
        self.entries
            .iter()
            .filter(|&(&len, _)| len >= floor && len < n)
            .max_by_key(|&(&len, _)| len)
            .map(|(&len, seq)| (len, seq.clone()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }
}
