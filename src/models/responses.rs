//! Response DTOs for the Fibonacci API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::sequence::StatsSnapshot;

/// Response body for `GET /stats`.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub engine: StatsSnapshot,
    /// (memo + shared hits) / all answered requests
    pub hit_rate: f64,
    pub memo_entries: usize,
    pub memo_capacity: usize,
    pub memo_evictions: u64,
    /// Shared cache backend name, or "unavailable"
    pub shared_cache: String,
    pub shared_cache_available: bool,
}

// == Health ==
/// Status of the service or one of its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
    Unknown,
}

/// Host resource usage. Missing readings are reported as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct SystemComponent {
    pub status: HealthStatus,
    pub cpu_usage_percent: Option<f64>,
    pub memory_usage_percent: Option<f64>,
    pub disk_usage_percent: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SharedCacheComponent {
    pub status: HealthStatus,
    pub backend: String,
    /// Ping round-trip, rounded to two decimals; `null` when the ping failed
    pub latency_ms: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationComponent {
    pub status: HealthStatus,
    pub request_handling: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthComponents {
    pub system: SystemComponent,
    /// Serialized as `redis` regardless of backend
    #[serde(rename = "redis")]
    pub shared_cache: SharedCacheComponent,
    pub application: ApplicationComponent,
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Current timestamp in RFC 3339 format
    pub timestamp: String,
    pub uptime_seconds: f64,
    pub components: HealthComponents,
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
