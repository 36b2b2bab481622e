//! Error types for the geo cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the geo cache.
///
/// Only construction can fail; every operation on a built cache is total.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A construction parameter is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The sweep task could not be spawned
    #[error("No async runtime: {0}")]
    NoRuntime(String),
}

// == Result Type Alias ==
/// Convenience Result type for the geo cache.
pub type Result<T> = std::result::Result<T, CacheError>;
