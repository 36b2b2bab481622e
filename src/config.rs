//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

// == Expiry Policy ==
/// How `get` treats an entry whose expiration has passed but which has not been swept yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryPolicy {
    /// Return it; only the sweep removes expired entries
    #[default]
    Lazy,
    /// Report it as absent (it stays in the store until swept)
    OnRead,
}

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Lifetime of entries stored with `Ttl::Default`; zero means never expire
    pub default_expiration: Duration,
    /// Interval between sweep passes
    pub cleanup_interval: Duration,
    /// Decimal digits kept when normalizing coordinates (1-8)
    pub precision: u8,
    /// Read-time handling of expired entries
    pub expiry_policy: ExpiryPolicy,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `GEOCACHE_DEFAULT_TTL` - Default TTL in seconds, 0 = never (default: 300)
    /// - `GEOCACHE_CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 30)
    /// - `GEOCACHE_PRECISION` - Decimal digits kept, 1-8 (default: 3)
    /// - `GEOCACHE_EXPIRE_ON_READ` - `true` or `1` hides expired entries from `get` (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            default_expiration: env::var("GEOCACHE_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_expiration),
            cleanup_interval: env::var("GEOCACHE_CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup_interval),
            precision: env::var("GEOCACHE_PRECISION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.precision),
            expiry_policy: env::var("GEOCACHE_EXPIRE_ON_READ")
                .ok()
                .map(|v| {
                    if matches!(v.trim(), "1" | "true" | "TRUE" | "True") {
                        ExpiryPolicy::OnRead
                    } else {
                        ExpiryPolicy::Lazy
                    }
                })
                .unwrap_or(defaults.expiry_policy),
        }
    }

    pub fn with_expiry_policy(mut self, policy: ExpiryPolicy) -> Self {
        self.expiry_policy = policy;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_expiration: Duration::from_secs(300),
            cleanup_interval: Duration::from_secs(30),
            precision: 3,
            expiry_policy: ExpiryPolicy::Lazy,
        }
    }
}
