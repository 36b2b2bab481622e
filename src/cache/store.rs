//! Geo Store Module
//!
//! The unsynchronized map from normalized point to entry. `GeoCache` wraps
//! it in a lock and drives its sweeps.

use std::collections::HashMap;
use std::time::Duration;

use crate::cache::{current_timestamp_ns, Entry, GeoPoint, Precision, Ttl};

// == Geo Store ==
/// Map of normalized points to entries, with the cache's expiration defaults.
#[derive(Debug)]
pub struct GeoStore<V> {
    /// Normalized point -> entry
    entries: HashMap<GeoPoint, Entry<V>>,
    /// Digits kept when normalizing keys
    precision: Precision,
    /// Lifetime used for `Ttl::Default`; zero means never expire
    default_expiration: Duration,
}

impl<V> GeoStore<V> {
    // == Constructor ==
    pub fn new(precision: Precision, default_expiration: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            precision,
            default_expiration,
        }
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn default_expiration(&self) -> Duration {
        self.default_expiration
    }

    // == Key ==
    /// Normalizes a raw point into this store's key space.
    pub fn key(&self, point: GeoPoint) -> GeoPoint {
        point.normalize(self.precision)
    }

    // == Set ==
    /// Stores a value in the cell containing `point`.
    ///
    /// An existing entry for the cell is replaced, value and expiration both.
    pub fn set(&mut self, point: GeoPoint, value: V, ttl: Ttl) {
        let entry = Entry::new(value, ttl.resolve(self.default_expiration));
        let key = self.key(point);
        self.entries.insert(key, entry);
    }

    // == Get ==
    /// Looks up the entry for the cell containing `point`.
    ///
    /// Expiration is not checked here; stale entries stay visible until swept.
    pub fn get(&self, point: GeoPoint) -> Option<&Entry<V>> {
        self.entries.get(&self.key(point))
    }

    // == Delete ==
    /// Removes the entry for the cell containing `point`, returning whether one existed.
    pub fn delete(&mut self, point: GeoPoint) -> bool {
        let key = self.key(point);
        self.entries.remove(&key).is_some()
    }

    // == Flush ==
    /// Drops every entry.
    pub fn flush(&mut self) {
        self.entries = HashMap::new();
    }

    // == Cleanup Expired ==
    /// Removes every entry whose expiration is strictly before now.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        self.cleanup_expired_at(current_timestamp_ns())
    }

    pub fn cleanup_expired_at(&mut self, now_ns: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now_ns));
        before - self.entries.len()
    }

    // == Iteration ==
    pub fn entries(&self) -> &HashMap<GeoPoint, Entry<V>> {
        &self.entries
    }

    // == Length ==
    /// Returns the current number of entries, expired-but-unswept included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn store() -> GeoStore<&'static str> {
        GeoStore::new(Precision::Within110M, Duration::from_secs(300))
    }

    #[test]
    fn test_store_new() {
        let store = store();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.precision(), Precision::Within110M);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store();
        let point = GeoPoint::new(41.234, 29.432);

        store.set(point, "istanbul", Ttl::Default);

        assert_eq!(store.get(point).unwrap().value, "istanbul");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store = store();
        assert!(store.get(GeoPoint::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_store_keys_are_normalized() {
        let mut store = store();
        store.set(GeoPoint::new(41.367421, 29.631689), "cell", Ttl::Default);

        let keys: Vec<_> = store.entries().keys().copied().collect();
        assert_eq!(keys, vec![GeoPoint::new(41.367, 29.631)]);
        assert!(store.get(GeoPoint::new(41.3679, 29.6311)).is_some());
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store();
        let point = GeoPoint::new(41.234, 29.432);

        store.set(point, "first", Ttl::After(Duration::from_secs(1)));
        store.set(point, "second", Ttl::Never);

        let entry = store.get(point).unwrap();
        assert_eq!(entry.value, "second");
        assert!(entry.expires_at.is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_ignores_expiration() {
        let mut store = store();
        let point = GeoPoint::new(10.0, 10.0);

        store.set(point, "stale", Ttl::After(Duration::from_millis(10)));
        sleep(Duration::from_millis(30));

        assert!(store.get(point).unwrap().is_expired());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store = store();
        let point = GeoPoint::new(41.234, 29.432);

        store.set(point, "value", Ttl::Default);
        assert!(store.delete(GeoPoint::new(41.2349, 29.4321)));
        assert!(!store.delete(point));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_flush() {
        let mut store = store();
        store.set(GeoPoint::new(1.0, 1.0), "a", Ttl::Default);
        store.set(GeoPoint::new(2.0, 2.0), "b", Ttl::Default);

        store.flush();

        assert!(store.is_empty());
        assert!(store.get(GeoPoint::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = store();
        store.set(GeoPoint::new(1.0, 1.0), "short", Ttl::After(Duration::from_millis(10)));
        store.set(GeoPoint::new(2.0, 2.0), "long", Ttl::After(Duration::from_secs(60)));
        store.set(GeoPoint::new(3.0, 3.0), "forever", Ttl::Never);

        sleep(Duration::from_millis(30));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 2);
        assert!(store.get(GeoPoint::new(2.0, 2.0)).is_some());
        assert!(store.get(GeoPoint::new(3.0, 3.0)).is_some());
    }

    #[test]
    fn test_store_cleanup_never_removes_unexpiring() {
        let mut store: GeoStore<u8> = GeoStore::new(Precision::Within1Km, Duration::ZERO);
        store.set(GeoPoint::new(1.0, 1.0), 1, Ttl::Default);

        assert_eq!(store.cleanup_expired_at(i64::MAX), 0);
        assert_eq!(store.len(), 1);
    }
}
