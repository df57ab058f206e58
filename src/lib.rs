//! Fib Service - Fibonacci sequences over HTTP
//!
//! Sequences are served from a bounded in-process memo, a shared Redis cache, or computed by
//! extending the longest known prefix. The shared cache is optional at runtime: when it is
//! unreachable the service keeps answering correctly from the memo and arithmetic alone.

pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod models;
pub mod sequence;
pub mod shared_cache;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use sequence::{EngineSettings, Sequence, SequenceEngine};
pub use shared_cache::{SharedCache, SharedCacheState};
pub use tasks::spawn_cleanup_task;
