//! API Handlers
//!
//! HTTP request handlers for each service endpoint.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use super::rate_limit::RateLimiter;
use crate::config::Config;
use crate::error::Result;
use crate::health;
use crate::models::{FibonacciQuery, HealthResponse, HealthStatus, StatsResponse};
use crate::sequence::{Sequence, SequenceEngine};
use crate::shared_cache::SharedCacheState;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SequenceEngine>,
    /// Budget for `/fibonacci`
    pub rate_limiter: Arc<RateLimiter>,
    /// Budgets shared by every other route
    pub default_limits: Arc<[Arc<RateLimiter>]>,
    /// Bound on the health-check ping
    pub cache_timeout: Duration,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(engine: SequenceEngine, rate_limiter: RateLimiter, cache_timeout: Duration) -> Self {
        Self {
            engine: Arc::new(engine),
            rate_limiter: Arc::new(rate_limiter),
            default_limits: Arc::from(Vec::new()),
            cache_timeout,
            started_at: Instant::now(),
        }
    }

    pub fn with_default_limits(mut self, limits: Vec<RateLimiter>) -> Self {
        self.default_limits = limits.into_iter().map(Arc::new).collect();
        self
    }

    /// Every limiter the state owns, for periodic pruning.
    pub fn rate_limiters(&self) -> Vec<Arc<RateLimiter>> {
        std::iter::once(self.rate_limiter.clone())
            .chain(self.default_limits.iter().cloned())
            .collect()
    }

    /// Builds the engine and rate limiters from configuration around an already-connected
    /// shared cache.
    pub fn from_config(config: &Config, shared: SharedCacheState) -> Self {
        Self::new(
            SequenceEngine::from_config(config, shared),
            RateLimiter::new(
                config.rate_limit_max_requests,
                Duration::from_secs(config.rate_limit_window_secs),
            ),
            config.cache_timeout(),
        )
        .with_default_limits(vec![
            RateLimiter::new(config.rate_limit_hourly, Duration::from_secs(60 * 60)),
            RateLimiter::new(config.rate_limit_daily, Duration::from_secs(24 * 60 * 60)),
        ])
    }
}

/// Handler for GET /fibonacci?n=<value>
///
/// Returns a JSON array of the first `n` Fibonacci numbers, starting from 0.
pub async fn fibonacci_handler(
    State(state): State<AppState>,
    Query(query): Query<FibonacciQuery>,
) -> Result<Json<Sequence>> {
    let n = query.length()?;
    let seq = state.engine.compute(n).await?;
    Ok(Json(seq))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let engine = &state.engine;
    let stats = engine.stats();
    let shared = engine.shared_cache();

    Json(StatsResponse {
        hit_rate: stats.hit_rate(),
        engine: stats,
        memo_entries: engine.memo_len().await,
        memo_capacity: engine.memo_capacity(),
        memo_evictions: engine.memo_evictions().await,
        shared_cache: shared.backend_name().to_string(),
        shared_cache_available: shared.is_available(),
    })
}

/// Handler for GET /health
///
/// Responds 503 when the report is unhealthy, 200 otherwise (including degraded).
pub async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let report = health::check(
        state.engine.shared_cache(),
        state.cache_timeout,
        state.started_at,
    )
    .await;

    let status = match report.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    (status, Json(report))
}
