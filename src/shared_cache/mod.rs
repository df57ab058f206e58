//! Shared Cache Module
//!
//! Key-value store shared by every service instance. The engine only ever sees the
//! [`SharedCache`] trait through a [`SharedCacheState`], which is explicit about whether a
//! backend is reachable at all.

mod connect;
mod memory;
mod redis_cache;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::SharedCacheError;

pub use connect::{connect_from_config, connect_with_retry};
pub use memory::InMemorySharedCache;
pub use redis_cache::RedisSharedCache;

// == Shared Cache Trait ==
/// Operations the service needs from a shared key-value store.
///
/// Implementations do not enforce timeouts themselves; callers wrap each call in [`bounded`].
#[async_trait]
pub trait SharedCache: Send + Sync {
    /// Returns the raw value stored under `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SharedCacheError>;

    /// Stores `value` under `key`, replacing any previous value, expiring after `ttl_secs`.
    async fn set_with_expiry(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_secs: u64,
    ) -> Result<(), SharedCacheError>;

    /// Round-trips to the backend. Used by startup and health checks.
    async fn ping(&self) -> Result<(), SharedCacheError>;

    /// Drops expired entries, returning how many were removed.
    ///
    /// Backends that expire keys on their own keep the default no-op.
    async fn purge_expired(&self) -> usize {
        0
    }

    /// Short label for logs and health output.
    fn backend_name(&self) -> &'static str;
}

// == Shared Cache State ==
/// Outcome of startup connection, fixed for the process lifetime.
#[derive(Clone)]
pub enum SharedCacheState {
    Connected(Arc<dyn SharedCache>),
    /// Every connection attempt failed; run on the memo and arithmetic alone
    Unavailable,
}

impl SharedCacheState {
    pub fn connected(cache: impl SharedCache + 'static) -> Self {
        Self::Connected(Arc::new(cache))
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    pub fn client(&self) -> Option<&Arc<dyn SharedCache>> {
        match self {
            Self::Connected(cache) => Some(cache),
            Self::Unavailable => None,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Connected(cache) => cache.backend_name(),
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Debug for SharedCacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected(cache) => f
                .debug_tuple("Connected")
                .field(&cache.backend_name())
                .finish(),
            Self::Unavailable => f.write_str("Unavailable"),
        }
    }
}

// == Timeout Helper ==
/// Runs a shared-cache call, failing with [`SharedCacheError::Timeout`] once `limit` elapses.
pub async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, SharedCacheError>
where
    F: Future<Output = Result<T, SharedCacheError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| SharedCacheError::Timeout(limit))?
}
