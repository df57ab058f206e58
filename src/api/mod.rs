//! API Module
//!
//! HTTP handlers, routing and rate limiting for the Fibonacci service.
//!
//! # Endpoints
//! - `GET /fibonacci?n=<value>` - First `n` Fibonacci numbers
//! - `GET /health` - Health report
//! - `GET /stats` - Engine statistics

pub mod handlers;
pub mod rate_limit;
pub mod routes;

pub use handlers::*;
pub use rate_limit::RateLimiter;
pub use routes::create_router;
