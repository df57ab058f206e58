//! In-Memory Shared Cache
//!
//! Process-local stand-in for Redis with per-entry TTL. Lets the service run without a
//! Redis instance and gives tests a cache they can inspect directly.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::SharedCacheError;
use crate::shared_cache::SharedCache;

// == Stored Value ==
#[derive(Debug, Clone)]
struct StoredValue {
    bytes: Vec<u8>,
    /// Expiration timestamp (Unix milliseconds)
    expires_at: u64,
}

impl StoredValue {
    fn new(bytes: Vec<u8>, ttl_secs: u64) -> Self {
        Self {
            bytes,
            expires_at: current_timestamp_ms().saturating_add(ttl_secs.saturating_mul(1000)),
        }
    }

    /// Expired once the current time reaches the expiration time.
    fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }
}

// == In-Memory Shared Cache ==
#[derive(Debug, Default)]
pub struct InMemorySharedCache {
    entries: RwLock<HashMap<String, StoredValue>>,
}

impl InMemorySharedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SharedCache for InMemorySharedCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SharedCacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|value| !value.is_expired())
            .map(|value| value.bytes.clone()))
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_secs: u64,
    ) -> Result<(), SharedCacheError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), StoredValue::new(value, ttl_secs));
        Ok(())
    }

    async fn ping(&self) -> Result<(), SharedCacheError> {
        Ok(())
    }

    async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, value| !value.is_expired());
        before - entries.len()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

// == Utility Functions ==
fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemorySharedCache::new();
        cache
            .set_with_expiry("fib_seq_3", b"[0,1,1]".to_vec(), 60)
            .await
            .unwrap();

        assert_eq!(
            cache.get("fib_seq_3").await.unwrap(),
            Some(b"[0,1,1]".to_vec())
        );
        assert_eq!(cache.get("fib_seq_4").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let cache = InMemorySharedCache::new();
        cache.set_with_expiry("k", b"a".to_vec(), 60).await.unwrap();
        cache.set_with_expiry("k", b"b".to_vec(), 60).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some(b"b".to_vec()));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let cache = InMemorySharedCache::new();
        cache.set_with_expiry("k", b"v".to_vec(), 1).await.unwrap();
        assert!(cache.get("k").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert!(cache.get("k").await.unwrap().is_none());
        assert_eq!(cache.purge_expired().await, 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_zero_ttl_is_immediately_expired() {
        let cache = InMemorySharedCache::new();
        cache.set_with_expiry("k", b"v".to_vec(), 0).await.unwrap();
        assert!(cache.get("k").await.unwrap().is_none());
    }
}
