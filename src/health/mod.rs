//! Health Reporting
//!
//! Combines host resource usage, shared-cache reachability and application state into the
//! `/health` report.
//!
//! # Status rules
//! - any resource above 95%: system `unhealthy`, overall `degraded`
//! - resource readings missing: system `unknown`, overall `degraded`
//! - cache ping above 100ms: cache `degraded`, overall `degraded`
//! - cache ping failed or cache unavailable: cache `unhealthy`, overall `unhealthy`

mod system;

use std::time::{Duration, Instant};

use tracing::warn;

use crate::models::{
    ApplicationComponent, HealthComponents, HealthResponse, HealthStatus, SharedCacheComponent,
    SystemComponent,
};
use crate::shared_cache::{bounded, SharedCacheState};

pub use system::{sample as sample_system, SystemSample};

/// Resource usage above which the host counts as unhealthy.
pub const RESOURCE_LIMIT_PERCENT: f64 = 95.0;

/// Ping latency above which the shared cache counts as degraded.
pub const CACHE_LATENCY_LIMIT: Duration = Duration::from_millis(100);

/// Result of pinging the shared cache.
#[derive(Debug, Clone)]
pub struct CacheProbe {
    pub backend: &'static str,
    /// Round-trip time, `None` when the ping failed or no cache is connected
    pub latency: Option<Duration>,
}

/// Pings the shared cache, bounded by `timeout`.
pub async fn probe_shared_cache(shared: &SharedCacheState, timeout: Duration) -> CacheProbe {
    let backend = shared.backend_name();
    let Some(client) = shared.client() else {
        return CacheProbe {
            backend,
            latency: None,
        };
    };

    let start = Instant::now();
    match bounded(timeout, client.ping()).await {
        Ok(()) => CacheProbe {
            backend,
            latency: Some(start.elapsed()),
        },
        Err(e) => {
            warn!("Shared cache health check failed: {}", e);
            CacheProbe {
                backend,
                latency: None,
            }
        }
    }
}

/// Runs every check and assembles the report.
pub async fn check(shared: &SharedCacheState, timeout: Duration, started_at: Instant) -> HealthResponse {
    let (system, cache) = tokio::join!(sample_system(), probe_shared_cache(shared, timeout));
    assess(system, cache, started_at.elapsed())
}

// == Assessment ==
/// Applies the status rules to already-collected readings.
pub fn assess(system: SystemSample, cache: CacheProbe, uptime: Duration) -> HealthResponse {
    let mut overall = HealthStatus::Healthy;

    let system_status = if !system.is_complete() {
        HealthStatus::Unknown
    } else if system.exceeds(RESOURCE_LIMIT_PERCENT) {
        HealthStatus::Unhealthy
    } else {
        HealthStatus::Healthy
    };
    if system_status != HealthStatus::Healthy {
        overall = worst(overall, HealthStatus::Degraded);
    }

    let cache_status = match cache.latency {
        None => HealthStatus::Unhealthy,
        Some(latency) if latency > CACHE_LATENCY_LIMIT => HealthStatus::Degraded,
        Some(_) => HealthStatus::Healthy,
    };
    overall = worst(overall, cache_status);

    HealthResponse {
        status: overall,
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_seconds: uptime.as_secs_f64(),
        components: HealthComponents {
            system: SystemComponent {
                status: system_status,
                cpu_usage_percent: system.cpu_usage_percent.map(round2),
                memory_usage_percent: system.memory_usage_percent.map(round2),
                disk_usage_percent: system.disk_usage_percent.map(round2),
            },
            shared_cache: SharedCacheComponent {
                status: cache_status,
                backend: cache.backend.to_string(),
                latency_ms: cache.latency.map(|l| round2(l.as_secs_f64() * 1000.0)),
            },
            application: ApplicationComponent {
                status: HealthStatus::Healthy,
                request_handling: true,
            },
        },
    }
}

/// Overall status only ever gets worse: healthy < degraded < unhealthy.
fn worst(current: HealthStatus, candidate: HealthStatus) -> HealthStatus {
    fn rank(status: HealthStatus) -> u8 {
        match status {
            HealthStatus::Healthy => 0,
            HealthStatus::Unknown | HealthStatus::Degraded => 1,
            HealthStatus::Unhealthy => 2,
        }
    }
    if rank(candidate) > rank(current) {
        candidate
    } else {
        current
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_cache::InMemorySharedCache;

    fn calm_system() -> SystemSample {
        SystemSample {
            cpu_usage_percent: Some(12.5),
            memory_usage_percent: Some(40.0),
            disk_usage_percent: Some(55.0),
        }
    }

    fn fast_cache() -> CacheProbe {
        CacheProbe {
            backend: "redis",
            latency: Some(Duration::from_millis(2)),
        }
    }

    #[test]
    fn test_all_healthy() {
        let report = assess(calm_system(), fast_cache(), Duration::from_secs(3));
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.uptime_seconds, 3.0);
        assert_eq!(report.components.shared_cache.latency_ms, Some(2.0));
    }

    #[test]
    fn test_resource_pressure_degrades() {
        let system = SystemSample {
            memory_usage_percent: Some(97.3),
            ..calm_system()
        };
        let report = assess(system, fast_cache(), Duration::ZERO);
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.components.system.status, HealthStatus::Unhealthy);
    }

    #[test]
    fn test_missing_readings_are_unknown() {
        let report = assess(SystemSample::default(), fast_cache(), Duration::ZERO);
        assert_eq!(report.components.system.status, HealthStatus::Unknown);
        assert_eq!(report.status, HealthStatus::Degraded);
    }

    #[test]
    fn test_slow_cache_degrades() {
        let cache = CacheProbe {
            backend: "redis",
            latency: Some(Duration::from_millis(250)),
        };
        let report = assess(calm_system(), cache, Duration::ZERO);
        assert_eq!(report.components.shared_cache.status, HealthStatus::Degraded);
        assert_eq!(report.status, HealthStatus::Degraded);
    }

    #[test]
    fn test_unreachable_cache_is_unhealthy() {
        let cache = CacheProbe {
            backend: "unavailable",
            latency: None,
        };
        let system = SystemSample {
            cpu_usage_percent: Some(99.0),
            ..calm_system()
        };
        let report = assess(system, cache, Duration::ZERO);
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert_eq!(report.components.shared_cache.latency_ms, None);
    }

    #[tokio::test]
    async fn test_probe_unavailable() {
        let probe = probe_shared_cache(&SharedCacheState::Unavailable, Duration::from_secs(1)).await;
        assert_eq!(probe.backend, "unavailable");
        assert!(probe.latency.is_none());
    }

    #[tokio::test]
    async fn test_probe_memory_cache() {
        let shared = SharedCacheState::connected(InMemorySharedCache::new());
        let probe = probe_shared_cache(&shared, Duration::from_secs(1)).await;
        assert_eq!(probe.backend, "memory");
        assert!(probe.latency.is_some());
    }
}
