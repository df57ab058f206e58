//! Request and Response models for the Fibonacci API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! deserializing query strings and serializing HTTP response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::FibonacciQuery;
pub use responses::{
    ApplicationComponent, ErrorResponse, HealthComponents, HealthResponse, HealthStatus,
    SharedCacheComponent, StatsResponse, SystemComponent,
};
