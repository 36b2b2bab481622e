//! Cache Entry Module
//!
//! Defines the structure for individual cache entries and per-call TTL selection.

use std::time::Duration;

use chrono::Utc;

// == Cache Entry ==
/// A cached value together with its absolute expiration instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<V> {
    /// The stored value
    pub value: V,
    /// Expiration timestamp (Unix nanoseconds), None = never expires
    pub expires_at: Option<i64>,
}

impl<V> Entry<V> {
    // == Constructor ==
    /// Creates an entry expiring `lifetime` from now, or never when `lifetime` is None.
    pub fn new(value: V, lifetime: Option<Duration>) -> Self {
        let expires_at = lifetime.map(|d| current_timestamp_ns().saturating_add(duration_ns(d)));

        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks whether the entry's expiration is strictly before `now_ns`.
    ///
    /// Entries without an expiration never report as expired.
    pub fn is_expired_at(&self, now_ns: i64) -> bool {
        match self.expires_at {
            Some(expires) => expires < now_ns,
            None => false,
        }
    }

    /// Checks expiration against the current wall-clock time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ns())
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or None if the entry never expires.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` once the expiration has passed
    /// - `Some(remaining)` while the entry is live
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at.map(|expires| {
            let remaining = expires.saturating_sub(current_timestamp_ns());
            Duration::from_nanos(u64::try_from(remaining).unwrap_or(0))
        })
    }
}

// == Ttl ==
/// Expiration requested for a single `set` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    /// Use the cache-wide default expiration
    #[default]
    Default,
    /// Never expire, whatever the cache default is
    Never,
    /// Expire after the given duration
    After(Duration),
}

impl Ttl {
    /// Resolves this request against the cache default.
    ///
    /// Returns None when the resulting entry must never expire.
    pub fn resolve(self, default_expiration: Duration) -> Option<Duration> {
        let lifetime = match self {
            Ttl::Never => return None,
            Ttl::Default => default_expiration,
            Ttl::After(d) if d.is_zero() => default_expiration,
            Ttl::After(d) => d,
        };

        if lifetime.is_zero() {
            None
        } else {
            Some(lifetime)
        }
    }
}

impl From<Duration> for Ttl {
    fn from(d: Duration) -> Self {
        if d.is_zero() {
            Ttl::Default
        } else {
            Ttl::After(d)
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in nanoseconds.
pub fn current_timestamp_ns() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

fn duration_ns(d: Duration) -> i64 {
    i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)
}
