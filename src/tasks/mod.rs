//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Rate limiter cleanup: forgets clients whose window has ended

mod cleanup;

pub use cleanup::spawn_cleanup_task;
