//! Geocache - An in-memory expiring cache keyed by coordinates
//!
//! Points are truncated to a fixed number of decimal digits, so every point
//! inside the same cell shares one entry. A background task sweeps out
//! expired entries.

pub mod cache;
pub mod config;
pub mod error;
pub mod geocache;
pub mod tasks;

pub use cache::{normalize, CacheStats, Entry, GeoPoint, Precision, Ttl};
pub use config::{CacheConfig, ExpiryPolicy};
pub use error::{CacheError, Result};
pub use geocache::GeoCache;
