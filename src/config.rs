//! Configuration Module
//!
//! Handles loading server, shared-cache and engine settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which shared cache implementation the server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedCacheBackend {
    /// Network-attached Redis instance
    Redis,
    /// Process-local stand-in, useful for local runs without Redis
    Memory,
}

impl FromStr for SharedCacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown shared cache backend: {}", other)),
        }
    }
}

/// Server configuration parameters.
///
/// All values are startup-time constants; every one can be overridden via environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Shared cache implementation
    pub cache_backend: SharedCacheBackend,
    /// Redis host name
    pub redis_host: String,
    /// Redis port
    pub redis_port: u16,
    /// Redis database index
    pub redis_db: u32,
    /// Upper bound for every shared-cache call, in seconds
    pub cache_timeout_secs: u64,
    /// Connection attempts made at startup before degrading
    pub connect_retries: u32,
    /// Delay between connection attempts, in milliseconds
    pub connect_retry_delay_ms: u64,
    /// TTL for sequences written to the shared cache
    pub cache_ttl_secs: u64,
    /// Maximum number of sequences kept in the in-process memo
    pub memo_capacity: usize,
    /// Maximum shared-cache lookups while searching for a reusable prefix
    pub prefix_scan_limit: usize,
    /// Requests allowed per client per window on /fibonacci
    pub rate_limit_max_requests: u32,
    /// Rate limit window length in seconds
    pub rate_limit_window_secs: u64,
    /// Requests allowed per client per hour on routes without their own limit
    pub rate_limit_hourly: u32,
    /// Requests allowed per client per day on routes without their own limit
    pub rate_limit_daily: u32,
    /// Interval between rate limiter cleanup runs in seconds
    pub rate_limit_cleanup_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 5000)
    /// - `SHARED_CACHE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `REDIS_HOST` / `REDIS_PORT` / `REDIS_DB` - Redis location (default: redis-cache:6379/0)
    /// - `CACHE_TIMEOUT_SECS` - Per-call shared cache timeout (default: 5)
    /// - `CONNECT_RETRIES` - Startup connection attempts (default: 5)
    /// - `CONNECT_RETRY_DELAY_MS` - Delay between attempts (default: 1000)
    /// - `CACHE_TTL_SECS` - Shared cache entry TTL (default: 3600)
    /// - `MEMO_CAPACITY` - In-process memo size (default: 1000)
    /// - `PREFIX_SCAN_LIMIT` - Shared lookups per prefix scan, 0 disables (default: 32)
    /// - `RATE_LIMIT_MAX_REQUESTS` - Requests per window (default: 10)
    /// - `RATE_LIMIT_WINDOW_SECS` - Window length (default: 60)
    /// - `RATE_LIMIT_HOURLY` - Default hourly budget for other routes, 0 disables (default: 50)
    /// - `RATE_LIMIT_DAILY` - Default daily budget for other routes, 0 disables (default: 200)
    /// - `RATE_LIMIT_CLEANUP_SECS` - Cleanup frequency (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cache_backend: env_or("SHARED_CACHE_BACKEND", defaults.cache_backend),
            redis_host: env::var("REDIS_HOST").unwrap_or(defaults.redis_host),
            redis_port: env_or("REDIS_PORT", defaults.redis_port),
            redis_db: env_or("REDIS_DB", defaults.redis_db),
            cache_timeout_secs: env_or("CACHE_TIMEOUT_SECS", defaults.cache_timeout_secs),
            connect_retries: env_or("CONNECT_RETRIES", defaults.connect_retries),
            connect_retry_delay_ms: env_or("CONNECT_RETRY_DELAY_MS", defaults.connect_retry_delay_ms),
            cache_ttl_secs: env_or("CACHE_TTL_SECS", defaults.cache_ttl_secs),
            memo_capacity: env_or("MEMO_CAPACITY", defaults.memo_capacity),
            prefix_scan_limit: env_or("PREFIX_SCAN_LIMIT", defaults.prefix_scan_limit),
            rate_limit_max_requests: env_or(
                "RATE_LIMIT_MAX_REQUESTS",
                defaults.rate_limit_max_requests,
            ),
            rate_limit_window_secs: env_or("RATE_LIMIT_WINDOW_SECS", defaults.rate_limit_window_secs),
            rate_limit_hourly: env_or("RATE_LIMIT_HOURLY", defaults.rate_limit_hourly),
            rate_limit_daily: env_or("RATE_LIMIT_DAILY", defaults.rate_limit_daily),
            rate_limit_cleanup_secs: env_or(
                "RATE_LIMIT_CLEANUP_SECS",
                defaults.rate_limit_cleanup_secs,
            ),
        }
    }

    /// Redis connection URL built from host, port and database index.
    pub fn redis_url(&self) -> String {
        format!(
            "redis://{}:{}/{}",
            self.redis_host, self.redis_port, self.redis_db
        )
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_secs(self.cache_timeout_secs)
    }

    pub fn connect_retry_delay(&self) -> Duration {
        Duration::from_millis(self.connect_retry_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 5000,
            cache_backend: SharedCacheBackend::Redis,
            redis_host: "redis-cache".to_string(),
            redis_port: 6379,
            redis_db: 0,
            cache_timeout_secs: 5,
            connect_retries: 5,
            connect_retry_delay_ms: 1000,
            cache_ttl_secs: 3600,
            memo_capacity: 1000,
            prefix_scan_limit: 32,
            rate_limit_max_requests: 10,
            rate_limit_window_secs: 60,
            rate_limit_hourly: 50,
            rate_limit_daily: 200,
            rate_limit_cleanup_secs: 60,
        }
    }
}

/// Parses an environment variable, falling back to `default` when unset or unparsable.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 5000);
        assert_eq!(config.cache_backend, SharedCacheBackend::Redis);
        assert_eq!(config.cache_ttl_secs, 3600);
        assert_eq!(config.memo_capacity, 1000);
        assert_eq!(config.connect_retries, 5);
        assert_eq!(config.cache_timeout(), Duration::from_secs(5));
        assert_eq!(config.rate_limit_max_requests, 10);
        assert_eq!(config.rate_limit_hourly, 50);
        assert_eq!(config.rate_limit_daily, 200);
    }

    #[test]
    fn test_redis_url() {
        let config = Config {
            redis_host: "localhost".to_string(),
            redis_port: 6380,
            redis_db: 2,
            ..Config::default()
        };
        assert_eq!(config.redis_url(), "redis://localhost:6380/2");
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("redis".parse(), Ok(SharedCacheBackend::Redis));
        assert_eq!(" Memory ".parse(), Ok(SharedCacheBackend::Memory));
        assert!("memcached".parse::<SharedCacheBackend>().is_err());
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("FIB_SERVICE_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("FIB_SERVICE_TEST_GARBAGE", 7u64), 7);
        env::remove_var("FIB_SERVICE_TEST_GARBAGE");
        assert_eq!(env_or("FIB_SERVICE_TEST_GARBAGE", 9u64), 9);
    }
}
