//! Startup Connection
//!
//! Connects to the shared cache with bounded retries, or settles on degraded mode.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::{Config, SharedCacheBackend};
use crate::error::SharedCacheError;
use crate::shared_cache::{
    bounded, InMemorySharedCache, RedisSharedCache, SharedCache, SharedCacheState,
};

/// Builds the shared cache selected by `config`.
///
/// The in-memory backend is always available. Redis gets `connect_retries` attempts, each
/// bounded by the cache timeout and confirmed with a `PING`.
pub async fn connect_from_config(config: &Config) -> SharedCacheState {
    match config.cache_backend {
        SharedCacheBackend::Memory => {
            info!("Using in-memory shared cache");
            SharedCacheState::connected(InMemorySharedCache::new())
        }
        SharedCacheBackend::Redis => {
            let url = config.redis_url();
            info!("Connecting to Redis at {}", url);
            connect_with_retry(
                config.connect_retries,
                config.connect_retry_delay(),
                config.cache_timeout(),
                || {
                    let url = url.clone();
                    async move {
                        let cache = RedisSharedCache::connect(&url).await?;
                        Ok(Arc::new(cache) as Arc<dyn SharedCache>)
                    }
                },
            )
            .await
        }
    }
}

/// Retries `connect` up to `attempts` times with a fixed `delay` between attempts.
///
/// A zero attempt count still makes one attempt. Once every attempt has failed the state is
/// [`SharedCacheState::Unavailable`] and is never revisited.
pub async fn connect_with_retry<F, Fut>(
    attempts: u32,
    delay: Duration,
    timeout: Duration,
    mut connect: F,
) -> SharedCacheState
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Arc<dyn SharedCache>, SharedCacheError>>,
{
    let attempts = attempts.max(1);

    for attempt in 1..=attempts {
        let result = bounded(timeout, async {
            let cache = connect().await?;
            cache.ping().await?;
            Ok(cache)
        })
        .await;

        match result {
            Ok(cache) => {
                info!(
                    "Connected to {} shared cache (attempt {}/{})",
                    cache.backend_name(),
                    attempt,
                    attempts
                );
                return SharedCacheState::Connected(cache);
            }
            Err(e) => {
                warn!(
                    "Shared cache connection attempt {}/{} failed: {}",
                    attempt, attempts, e
                );
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    warn!("Shared cache not available - falling back to in-process memo only");
    SharedCacheState::Unavailable
}
