//! Geo Cache Module
//!
//! The shared, thread-safe cache handle: a locked `GeoStore` plus the sweep
//! task that owns its expiration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::{
    current_timestamp_ns, CacheStats, Entry, GeoPoint, GeoStore, Precision, StatsCounters, Ttl,
};
use crate::config::{CacheConfig, ExpiryPolicy};
use crate::error::Result;
use crate::tasks::{spawn_sweep_task, SweepHandle};

// == Geo Cache ==
/// Expiring cache keyed by coordinates truncated to a fixed precision.
///
/// Readers (`get`, `items`, `item_count`) share a read lock; writers (`set`,
/// `delete`, `flush` and the sweep) take the write lock. Must be created
/// inside a tokio runtime, which hosts the sweep task.
///
/// # Example
/// ```ignore
/// let cache = GeoCache::new(Duration::from_secs(300), Duration::from_secs(30), 3)?;
/// cache.set(GeoPoint::new(41.2341, 29.4321), "Istanbul", Ttl::Default).await;
/// assert_eq!(cache.get(GeoPoint::new(41.2348, 29.4329)).await, Some("Istanbul"));
/// cache.stop_cleanup().await;
/// ```
#[derive(Debug)]
pub struct GeoCache<V> {
    store: Arc<RwLock<GeoStore<V>>>,
    stats: Arc<StatsCounters>,
    sweeper: Mutex<Option<SweepHandle>>,
    cleanup_interval: Duration,
    expiry_policy: ExpiryPolicy,
}

impl<V> GeoCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache with lazy read-time expiry and starts its sweep task.
    ///
    /// # Arguments
    /// * `default_expiration` - Lifetime for `Ttl::Default` entries; zero means never expire
    /// * `cleanup_interval` - Time between sweep passes
    /// * `precision` - Decimal digits kept from each coordinate, 1-8
    ///
    /// # Errors
    /// - `InvalidConfiguration` if `precision` is outside 1-8 or `cleanup_interval` is zero
    /// - `NoRuntime` if called outside a tokio runtime
    pub fn new(default_expiration: Duration, cleanup_interval: Duration, precision: u8) -> Result<Self> {
        Self::from_config(CacheConfig {
            default_expiration,
            cleanup_interval,
            precision,
            expiry_policy: ExpiryPolicy::Lazy,
        })
    }

    /// Creates a cache from a full configuration and starts its sweep task.
    pub fn from_config(config: CacheConfig) -> Result<Self> {
        let precision = Precision::try_from(config.precision)?;
        let store = Arc::new(RwLock::new(GeoStore::new(
            precision,
            config.default_expiration,
        )));
        let stats = Arc::new(StatsCounters::new());

        let sweeper = spawn_sweep_task(store.clone(), stats.clone(), config.cleanup_interval)?;

        info!(
            precision = precision.digits(),
            default_expiration_ms = config.default_expiration.as_millis() as u64,
            cleanup_interval_ms = config.cleanup_interval.as_millis() as u64,
            "Geo cache created"
        );

        Ok(Self {
            store,
            stats,
            sweeper: Mutex::new(Some(sweeper)),
            cleanup_interval: config.cleanup_interval,
            expiry_policy: config.expiry_policy,
        })
    }

    // == Set ==
    /// Stores `value` for the cell containing `point`, replacing any previous entry.
    ///
    /// `ttl` accepts a `Ttl` or a `Duration`; a zero duration selects the
    /// cache default.
    pub async fn set(&self, point: GeoPoint, value: V, ttl: impl Into<Ttl>) {
        self.store.write().await.set(point, value, ttl.into());
    }

    // == Get ==
    /// Returns the value stored for the cell containing `point`.
    ///
    /// Under `ExpiryPolicy::Lazy` an expired entry is still returned until
    /// the sweep removes it.
    pub async fn get(&self, point: GeoPoint) -> Option<V> {
        let store = self.store.read().await;

        let value = store.get(point).and_then(|entry| match self.expiry_policy {
            ExpiryPolicy::OnRead if entry.is_expired_at(current_timestamp_ns()) => None,
            _ => Some(entry.value.clone()),
        });

        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    // == Delete ==
    /// Removes the entry for the cell containing `point`, returning whether one existed.
    pub async fn delete(&self, point: GeoPoint) -> bool {
        self.store.write().await.delete(point)
    }

    // == Items ==
    /// Returns a snapshot of every stored entry, expired-but-unswept included.
    pub async fn items(&self) -> HashMap<GeoPoint, Entry<V>> {
        self.store.read().await.entries().clone()
    }

    // == Item Count ==
    /// Returns the number of stored entries, expired-but-unswept included.
    pub async fn item_count(&self) -> usize {
        self.store.read().await.len()
    }

    // == Flush ==
    /// Drops every entry.
    pub async fn flush(&self) {
        let mut store = self.store.write().await;
        let dropped = store.len();
        store.flush();
        debug!("Flushed {} entries", dropped);
    }

    // == Delete Expired ==
    /// Runs one sweep pass immediately, returning the number of entries removed.
    pub async fn delete_expired(&self) -> usize {
        let removed = self.store.write().await.cleanup_expired();
        self.stats.record_sweep(removed);
        removed
    }

    // == Stop Cleanup ==
    /// Stops the sweep task and waits for it to exit.
    ///
    /// Returns true if this call stopped the task; repeated calls are no-ops
    /// returning false. Entries stay readable after the sweep has stopped.
    pub async fn stop_cleanup(&self) -> bool {
        let handle = self.sweeper.lock().await.take();

        match handle {
            Some(mut handle) => handle.stop().await,
            None => {
                warn!("Sweep task already stopped");
                false
            }
        }
    }

    pub async fn is_cleanup_running(&self) -> bool {
        self.sweeper
            .lock()
            .await
            .as_ref()
            .is_some_and(SweepHandle::is_running)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let total = self.store.read().await.len();
        self.stats.snapshot(total)
    }

    // == Accessors ==
    pub async fn precision(&self) -> Precision {
        self.store.read().await.precision()
    }

    pub async fn default_expiration(&self) -> Duration {
        self.store.read().await.default_expiration()
    }

    pub fn cleanup_interval(&self) -> Duration {
        self.cleanup_interval
    }

    pub fn expiry_policy(&self) -> ExpiryPolicy {
        self.expiry_policy
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;

    const LONG: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn test_new_validates_precision() {
        for precision in [0u8, 9, 42] {
            let result = GeoCache::<u8>::new(LONG, LONG, precision);
            assert!(matches!(result, Err(CacheError::InvalidConfiguration(_))));
        }

        for precision in 1u8..=8 {
            let cache = GeoCache::<u8>::new(LONG, LONG, precision).unwrap();
            assert_eq!(cache.precision().await.digits(), precision);
            cache.stop_cleanup().await;
        }
    }

    #[tokio::test]
    async fn test_new_rejects_zero_interval() {
        let result = GeoCache::<u8>::new(LONG, Duration::ZERO, 3);
        assert!(matches!(result, Err(CacheError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_new_outside_runtime() {
        let result = GeoCache::<u8>::new(LONG, LONG, 3);
        assert!(matches!(result, Err(CacheError::NoRuntime(_))));
    }

    #[tokio::test]
    async fn test_get_missing_point() {
        let cache = GeoCache::<String>::new(LONG, LONG, 2).unwrap();

        assert_eq!(cache.get(GeoPoint::new(41.234, 29.432)).await, None);
        assert_eq!(cache.stats().await.misses, 1);
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = GeoCache::new(LONG, LONG, 2).unwrap();
        let point = GeoPoint::new(41.234, 29.432);

        cache.set(point, "hello".to_string(), Duration::from_secs(600)).await;

        assert_eq!(cache.get(point).await.as_deref(), Some("hello"));
        assert_eq!(cache.item_count().await, 1);
        assert_eq!(cache.stats().await.hits, 1);
    }

    #[tokio::test]
    async fn test_default_ttl_applied() {
        let cache = GeoCache::new(Duration::from_secs(60), LONG, 3).unwrap();
        let point = GeoPoint::new(1.5, 2.5);

        cache.set(point, 1u32, Duration::ZERO).await;

        let items = cache.items().await;
        let remaining = items[&point].ttl_remaining().unwrap();
        assert!(remaining > Duration::from_secs(58));
        assert!(remaining <= Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_zero_default_never_expires() {
        let cache = GeoCache::new(Duration::ZERO, LONG, 3).unwrap();
        let point = GeoPoint::new(1.5, 2.5);

        cache.set(point, 1u32, Ttl::Default).await;

        assert!(cache.items().await[&point].expires_at.is_none());
    }

    #[tokio::test]
    async fn test_expire_on_read_policy() {
        let config = CacheConfig {
            cleanup_interval: LONG,
            ..CacheConfig::default()
        }
        .with_expiry_policy(ExpiryPolicy::OnRead);
        let cache = GeoCache::from_config(config).unwrap();
        let point = GeoPoint::new(3.0, 4.0);

        cache.set(point, "soon gone", Duration::from_millis(10)).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.get(point).await, None);
        // Still stored until a sweep runs
        assert_eq!(cache.item_count().await, 1);
        assert_eq!(cache.delete_expired().await, 1);
        assert_eq!(cache.item_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = GeoCache::new(LONG, LONG, 3).unwrap();
        let point = GeoPoint::new(41.2341, 29.4321);

        cache.set(point, 'x', Ttl::Default).await;

        assert!(cache.delete(GeoPoint::new(41.2345, 29.4329)).await);
        assert!(!cache.delete(point).await);
        assert_eq!(cache.get(point).await, None);
    }

    #[tokio::test]
    async fn test_stop_cleanup_twice() {
        let cache = GeoCache::<u8>::new(LONG, Duration::from_millis(10), 3).unwrap();

        assert!(cache.is_cleanup_running().await);
        assert!(cache.stop_cleanup().await);
        assert!(!cache.is_cleanup_running().await);
        assert!(!cache.stop_cleanup().await);
    }

    #[tokio::test]
    async fn test_readable_after_stop() {
        let cache = GeoCache::new(LONG, Duration::from_millis(10), 3).unwrap();
        let point = GeoPoint::new(10.0, 20.0);

        cache.set(point, 5i64, Ttl::Never).await;
        cache.stop_cleanup().await;

        assert_eq!(cache.get(point).await, Some(5));
        assert_eq!(cache.items().await.len(), 1);
    }
}
