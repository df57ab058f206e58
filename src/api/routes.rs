//! API Routes
//!
//! Configures the Axum router with all service endpoints.

use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{fibonacci_handler, health_handler, stats_handler, AppState};
use super::rate_limit::{default_rate_limit, rate_limit};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /fibonacci?n=<value>` - First `n` Fibonacci numbers
/// - `GET /health` - Health report
/// - `GET /stats` - Engine and memo statistics
///
/// # Rate Limits
/// - `/fibonacci`: its own per-client budget, replacing the defaults
/// - Other routes: the default hourly and daily per-client budgets
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let limited = Router::new()
        .route("/fibonacci", get(fibonacci_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    let defaults = Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            default_rate_limit,
        ));

    Router::new()
        .merge(limited)
        .merge(defaults)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
