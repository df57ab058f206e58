//! Sequence Module
//!
//! Fibonacci arithmetic, the cache wire format, the bounded in-process memo and the engine
//! tying them to the shared cache.

pub mod codec;
mod engine;
pub mod fib;
mod lru;
mod memo;
mod stats;


pub use engine::{EngineSettings, SequenceEngine};
pub use fib::{Sequence, MAX_SEQUENCE_LENGTH};
pub use lru::LruTracker;
pub use memo::SequenceMemo;
pub use stats::{EngineStats, StatsSnapshot};
