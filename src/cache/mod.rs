//! Cache Module
//!
//! Provides the spatial key normalization and the expiring store.

mod entry;
mod point;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ns, Entry, Ttl};
pub use point::{normalize, GeoPoint, Precision};
pub use stats::{CacheStats, StatsCounters};
pub use store::GeoStore;
