//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache.
//!
//! # Tasks
//! - Sweep: Removes expired entries at the configured interval

mod sweep;

pub use sweep::{spawn_sweep_task, SweepHandle};
