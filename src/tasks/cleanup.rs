//! Cleanup Task
//!
//! Background task that periodically forgets clients whose rate-limit windows have ended and
//! purges expired entries from shared caches that do not expire keys themselves.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::api::RateLimiter;
use crate::shared_cache::SharedCacheState;

/// Spawns a background task that runs every `cleanup_interval_secs` seconds.
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
pub fn spawn_cleanup_task(
    limiters: Vec<Arc<RateLimiter>>,
    shared: SharedCacheState,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let mut forgotten = 0;
            for limiter in &limiters {
                forgotten += limiter.cleanup_expired().await;
            }

            let purged = match shared.client() {
                Some(cache) => cache.purge_expired().await,
                None => 0,
            };

            if forgotten > 0 || purged > 0 {
                info!(
                    "Cleanup: forgot {} idle clients, purged {} expired cache entries",
                    forgotten, purged
                );
            } else {
                debug!("Cleanup: nothing to remove");
            }
        }
    })
}
