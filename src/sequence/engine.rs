//! Sequence Engine
//!
//! Cache-and-compute policy for Fibonacci sequences:
//!
//! 1. in-process memo
//! 2. exact entry in the shared cache
//! 3. base cases
//! 4. extend the longest known shorter sequence (memo first, then a bounded shared scan)
//! 5. compute from scratch
//!
//! Shared-cache problems of any kind are logged and treated as misses. They never change the
//! returned value and never surface as errors.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::SequenceError;
use crate::sequence::codec::{cache_key, decode, encode};
use crate::sequence::fib::{base_case, extend, generate, Sequence, MAX_SEQUENCE_LENGTH};
use crate::sequence::memo::SequenceMemo;
use crate::sequence::stats::{EngineStats, StatsSnapshot};
use crate::shared_cache::{bounded, SharedCache, SharedCacheState};

// == Engine Settings ==
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// TTL applied to every shared-cache write
    pub ttl_secs: u64,
    /// Upper bound on each shared-cache call
    pub call_timeout: Duration,
    /// Maximum shared-cache reads while looking for a reusable prefix; 0 disables the scan
    pub prefix_scan_limit: usize,
    /// In-process memo size
    pub memo_capacity: usize,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ttl_secs: config.cache_ttl_secs,
            call_timeout: config.cache_timeout(),
            prefix_scan_limit: config.prefix_scan_limit,
            memo_capacity: config.memo_capacity,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Result of a single shared-cache read.
enum Lookup {
    Hit(Sequence),
    Miss,
    /// The cache could not be reached; further reads this request are pointless
    Failed,
}

// == Sequence Engine ==
pub struct SequenceEngine {
    memo: Mutex<SequenceMemo>,
    shared: SharedCacheState,
    settings: EngineSettings,
    stats: EngineStats,
}

impl SequenceEngine {
    pub fn new(shared: SharedCacheState, settings: EngineSettings) -> Self {
        Self {
            memo: Mutex::new(SequenceMemo::new(settings.memo_capacity)),
            shared,
            settings,
            stats: EngineStats::new(),
        }
    }

    pub fn from_config(config: &Config, shared: SharedCacheState) -> Self {
        Self::new(shared, EngineSettings::from_config(config))
    }

    // == Compute ==
    /// Returns the first `n` Fibonacci numbers.
    ///
    /// Fails only when `n` exceeds [`MAX_SEQUENCE_LENGTH`], which input validation rules out.
    pub async fn compute(&self, n: usize) -> Result<Sequence, SequenceError> {
        if n > MAX_SEQUENCE_LENGTH {
            return Err(SequenceError::LengthOutOfRange {
                requested: n,
                max: MAX_SEQUENCE_LENGTH,
            });
        }

        let memoized = self.memo.lock().await.get(n);
        if let Some(seq) = memoized {
            debug!("Memo hit for length {}", n);
            self.stats.record_memo_hit();
            return Ok(seq);
        }

        // Cleared on the first unreachable-cache failure; no further shared calls this request
        let mut shared = self.shared.client();

        if let Some(client) = shared {
            match self.lookup(client, n).await {
                Lookup::Hit(seq) => {
                    debug!("Shared cache hit for length {}", n);
                    self.stats.record_shared_hit();
                    self.remember(n, &seq).await;
                    return Ok(seq);
                }
                Lookup::Miss => {}
                Lookup::Failed => shared = None,
            }
        }

        if let Some(seq) = base_case(n) {
            self.stats.record_computed();
            self.remember(n, &seq).await;
            return Ok(seq);
        }

        let seq = match self.find_prefix(n, &mut shared).await {
            Some(prefix) => {
                debug!("Extending known length {} to {}", prefix.len(), n);
                self.stats.record_prefix_reuse();
                extend(prefix, n)
            }
            None => {
                self.stats.record_computed();
                generate(n)
            }
        };

        if let Some(client) = shared {
            self.store_shared(client, n, &seq).await;
        }
        self.remember(n, &seq).await;
        Ok(seq)
    }

    // == Prefix Search ==
    /// Finds the longest known sequence with length in `[2, n)`.
    ///
    /// The memo is consulted first. The shared cache is then scanned downward from `n - 1`,
    /// only above the memo's best and for at most `prefix_scan_limit` reads. The first
    /// unreachable-cache failure ends the scan and clears `shared` for the rest of the request.
    async fn find_prefix(
        &self,
        n: usize,
        shared: &mut Option<&Arc<dyn SharedCache>>,
    ) -> Option<Sequence> {
        let memo_best = self.memo.lock().await.longest_below(n, 2);
        let floor = memo_best.as_ref().map_or(2, |(len, _)| len + 1);

        if let Some(client) = *shared {
            let lowest = n.saturating_sub(self.settings.prefix_scan_limit).max(floor);
            for len in (lowest..n).rev() {
                match self.lookup(client, len).await {
                    Lookup::Hit(seq) => return Some(seq),
                    Lookup::Miss => continue,
                    Lookup::Failed => {
                        *shared = None;
                        break;
                    }
                }
            }
        }

        memo_best.map(|(_, seq)| seq)
    }

    // == Shared Cache Access ==
    async fn lookup(&self, client: &Arc<dyn SharedCache>, n: usize) -> Lookup {
        let key = cache_key(n);
        match bounded(self.settings.call_timeout, client.get(&key)).await {
            Ok(Some(bytes)) => match decode(&bytes, n) {
                Ok(seq) => Lookup::Hit(seq),
                Err(e) => {
                    warn!("Ignoring cached value for {}: {}", key, e);
                    self.stats.record_shared_error();
                    Lookup::Miss
                }
            },
            Ok(None) => Lookup::Miss,
            Err(e) => {
                warn!("Shared cache read for {} failed: {}", key, e);
                self.stats.record_shared_error();
                Lookup::Failed
            }
        }
    }

    /// Writes the sequence back under its exact key. Failures are logged and dropped.
    async fn store_shared(&self, client: &Arc<dyn SharedCache>, n: usize, seq: &[u64]) {
        let key = cache_key(n);
        let write = client.set_with_expiry(&key, encode(seq), self.settings.ttl_secs);
        match bounded(self.settings.call_timeout, write).await {
            Ok(()) => debug!("Cached {} for {}s", key, self.settings.ttl_secs),
            Err(e) => {
                warn!("Shared cache write for {} failed: {}", key, e);
                self.stats.record_shared_error();
            }
        }
    }

    async fn remember(&self, n: usize, seq: &Sequence) {
        self.memo.lock().await.insert(n, seq.clone());
    }

    // == Introspection ==
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub async fn memo_len(&self) -> usize {
        self.memo.lock().await.len()
    }

    pub async fn memo_evictions(&self) -> u64 {
        self.memo.lock().await.evictions()
    }

    pub fn memo_capacity(&self) -> usize {
        self.settings.memo_capacity
    }

    pub fn shared_cache(&self) -> &SharedCacheState {
        &self.shared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SharedCacheError;
    use crate::shared_cache::InMemorySharedCache;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts reads and reports every key as absent.
    #[derive(Default)]
    struct CountingMissCache {
        reads: AtomicUsize,
    }

    #[async_trait]
    impl SharedCache for CountingMissCache {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, SharedCacheError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }

        async fn set_with_expiry(
            &self,
            _key: &str,
            _value: Vec<u8>,
            _ttl_secs: u64,
        ) -> Result<(), SharedCacheError> {
            Ok(())
        }

        async fn ping(&self) -> Result<(), SharedCacheError> {
            Ok(())
        }

        fn backend_name(&self) -> &'static str {
            "counting"
        }
    }

    /// Every call fails as if the server refused the connection.
    #[derive(Default)]
    struct FailingCache {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SharedCache for FailingCache {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, SharedCacheError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SharedCacheError::Connection("connection refused".to_string()))
        }

        async fn set_with_expiry(
            &self,
            _key: &str,
            _value: Vec<u8>,
            _ttl_secs: u64,
        ) -> Result<(), SharedCacheError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SharedCacheError::Connection("connection refused".to_string()))
        }

        async fn ping(&self) -> Result<(), SharedCacheError> {
            Err(SharedCacheError::Connection("connection refused".to_string()))
        }

        fn backend_name(&self) -> &'static str {
            "failing"
        }
    }

    /// Misses for the first `healthy_reads` reads, then fails every call.
    struct FailAfterCache {
        healthy_reads: usize,
        calls: AtomicUsize,
        writes: AtomicUsize,
    }

    impl FailAfterCache {
        fn new(healthy_reads: usize) -> Self {
            Self {
                healthy_reads,
                calls: AtomicUsize::new(0),
                writes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SharedCache for FailAfterCache {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, SharedCacheError> {
            let previous = self.calls.fetch_add(1, Ordering::SeqCst);
            if previous < self.healthy_reads {
                Ok(None)
            } else {
                Err(SharedCacheError::Timeout(Duration::from_millis(200)))
            }
        }

        async fn set_with_expiry(
            &self,
            _key: &str,
            _value: Vec<u8>,
            _ttl_secs: u64,
        ) -> Result<(), SharedCacheError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn ping(&self) -> Result<(), SharedCacheError> {
            Ok(())
        }

        fn backend_name(&self) -> &'static str {
            "fail-after"
        }
    }

    fn settings() -> EngineSettings {
        EngineSettings {
            call_timeout: Duration::from_millis(200),
            ..EngineSettings::default()
        }
    }

    #[tokio::test]
    async fn test_compute_without_shared_cache() {
        let engine = SequenceEngine::new(SharedCacheState::Unavailable, settings());

        assert_eq!(engine.compute(0).await.unwrap(), Vec::<u64>::new());
        assert_eq!(engine.compute(2).await.unwrap(), vec![0, 1]);
        assert_eq!(
            engine.compute(10).await.unwrap(),
            vec![0, 1, 1, 2, 3, 5, 8, 13, 21, 34]
        );
    }

    #[tokio::test]
    async fn test_compute_rejects_overflowing_length() {
        let engine = SequenceEngine::new(SharedCacheState::Unavailable, settings());
        let result = engine.compute(MAX_SEQUENCE_LENGTH + 1).await;
        assert_eq!(
            result,
            Err(SequenceError::LengthOutOfRange {
                requested: 95,
                max: 94
            })
        );
        assert!(engine.compute(MAX_SEQUENCE_LENGTH).await.is_ok());
    }

    #[tokio::test]
    async fn test_second_call_hits_memo() {
        let engine = SequenceEngine::new(SharedCacheState::Unavailable, settings());
        let first = engine.compute(20).await.unwrap();
        let second = engine.compute(20).await.unwrap();

        assert_eq!(first, second);
        let stats = engine.stats();
        assert_eq!(stats.computed, 1);
        assert_eq!(stats.memo_hits, 1);
    }

    #[tokio::test]
    async fn test_memo_prefix_is_reused() {
        let engine = SequenceEngine::new(SharedCacheState::Unavailable, settings());
        engine.compute(30).await.unwrap();
        let seq = engine.compute(40).await.unwrap();

        assert_eq!(seq, generate(40));
        assert_eq!(engine.stats().prefix_reuses, 1);
    }

    #[tokio::test]
    async fn test_only_length_two_and_up_is_written_back() {
        let cache = Arc::new(InMemorySharedCache::new());
        let engine = SequenceEngine::new(
            SharedCacheState::Connected(cache.clone()),
            settings(),
        );

        engine.compute(0).await.unwrap();
        engine.compute(1).await.unwrap();
        assert!(cache.is_empty().await);

        assert_eq!(engine.compute(2).await.unwrap(), vec![0, 1]);
        let raw = cache.get(&cache_key(2)).await.unwrap().unwrap();
        assert_eq!(decode(&raw, 2).unwrap(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_failed_exact_read_skips_scan_and_write() {
        let cache = Arc::new(FailingCache::default());
        let engine = SequenceEngine::new(
            SharedCacheState::Connected(cache.clone()),
            settings(),
        );

        assert_eq!(engine.compute(30).await.unwrap(), generate(30));
        assert_eq!(cache.calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.stats().shared_errors, 1);
    }

    #[tokio::test]
    async fn test_failed_scan_read_skips_write() {
        let cache = Arc::new(FailAfterCache::new(2));
        let engine = SequenceEngine::new(
            SharedCacheState::Connected(cache.clone()),
            settings(),
        );

        assert_eq!(engine.compute(30).await.unwrap(), generate(30));
        // Exact miss, one scan miss, then the failing read ends all shared access
        assert_eq!(cache.calls.load(Ordering::SeqCst), 3);
        assert_eq!(cache.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_prefix_scan_respects_limit() {
        let cache = Arc::new(CountingMissCache::default());
        let engine = SequenceEngine::new(
            SharedCacheState::Connected(cache.clone()),
            EngineSettings {
                prefix_scan_limit: 5,
                ..settings()
            },
        );

        assert_eq!(engine.compute(50).await.unwrap(), generate(50));
        // One exact lookup plus five scan lookups
        assert_eq!(cache.reads.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_prefix_scan_disabled() {
        let cache = Arc::new(CountingMissCache::default());
        let engine = SequenceEngine::new(
            SharedCacheState::Connected(cache.clone()),
            EngineSettings {
                prefix_scan_limit: 0,
                ..settings()
            },
        );

        engine.compute(50).await.unwrap();
        assert_eq!(cache.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_prefix_scan_stops_above_memo_best() {
        let cache = Arc::new(CountingMissCache::default());
        let engine = SequenceEngine::new(
            SharedCacheState::Connected(cache.clone()),
            settings(),
        );

        engine.compute(45).await.unwrap();
        let reads_before = cache.reads.load(Ordering::SeqCst);

        engine.compute(48).await.unwrap();
        // Exact lookup for 48, then scan 47 and 46 only
        assert_eq!(cache.reads.load(Ordering::SeqCst) - reads_before, 3);
        assert_eq!(engine.stats().prefix_reuses, 1);
    }

    #[tokio::test]
    async fn test_memo_stays_within_capacity() {
        let engine = SequenceEngine::new(
            SharedCacheState::Unavailable,
            EngineSettings {
                memo_capacity: 4,
                ..settings()
            },
        );

        for n in 0..20 {
            engine.compute(n).await.unwrap();
        }

        assert_eq!(engine.memo_len().await, 4);
        assert_eq!(engine.memo_evictions().await, 16);
    }
}
