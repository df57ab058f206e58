//! Engine Statistics Module
//!
//! Counts where each computed sequence came from and how often the shared cache failed.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Engine Stats ==
/// Lock-free counters updated by concurrent `compute` calls.
#[derive(Debug, Default)]
pub struct EngineStats {
    memo_hits: AtomicU64,
    shared_hits: AtomicU64,
    prefix_reuses: AtomicU64,
    computed: AtomicU64,
    shared_errors: AtomicU64,
}

/// Point-in-time copy of [`EngineStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Answered from the in-process memo
    pub memo_hits: u64,
    /// Answered from an exact shared-cache entry
    pub shared_hits: u64,
    /// Extended from a shorter known sequence
    pub prefix_reuses: u64,
    /// Computed from scratch
    pub computed: u64,
    /// Shared-cache calls that failed, timed out or returned garbage
    pub shared_errors: u64,
}

impl StatsSnapshot {
    /// Fraction of requests answered without any arithmetic.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.memo_hits + self.shared_hits;
        let total = hits + self.prefix_reuses + self.computed;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

impl EngineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_memo_hit(&self) {
        self.memo_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_shared_hit(&self) {
        self.shared_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prefix_reuse(&self) {
        self.prefix_reuses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_computed(&self) {
        self.computed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_shared_error(&self) {
        self.shared_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            memo_hits: self.memo_hits.load(Ordering::Relaxed),
            shared_hits: self.shared_hits.load(Ordering::Relaxed),
            prefix_reuses: self.prefix_reuses.load(Ordering::Relaxed),
            computed: self.computed.load(Ordering::Relaxed),
            shared_errors: self.shared_errors.load(Ordering::Relaxed),
        }
    }
}
