//! Redis Shared Cache
//!
//! Talks to Redis over a single multiplexed async connection opened at startup.

use std::fmt;

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};

use crate::error::SharedCacheError;
use crate::shared_cache::SharedCache;

/// Redis-backed shared cache.
///
/// The multiplexed connection is cheap to clone, so every call clones it instead of
/// serializing callers behind a lock.
#[derive(Clone)]
pub struct RedisSharedCache {
    conn: MultiplexedConnection,
    address: String,
}

impl RedisSharedCache {
    /// Opens a connection to `url` (e.g. `redis://redis-cache:6379/0`).
    ///
    /// Does not retry; see [`connect_with_retry`](crate::shared_cache::connect_with_retry).
    pub async fn connect(url: &str) -> Result<Self, SharedCacheError> {
        let client = Client::open(url).map_err(|e| {
            SharedCacheError::Connection(format!("invalid Redis URL {}: {}", url, e))
        })?;

        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| SharedCacheError::Connection(format!("{}: {}", url, e)))?;

        Ok(Self {
            conn,
            address: url.to_string(),
        })
    }
}

#[async_trait]
impl SharedCache for RedisSharedCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SharedCacheError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_secs: u64,
    ) -> Result<(), SharedCacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), SharedCacheError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

impl fmt::Debug for RedisSharedCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisSharedCache")
            .field("address", &self.address)
            .finish()
    }
}
