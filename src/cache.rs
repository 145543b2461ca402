/* src/cache.rs */

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;

use crate::classifier::RegionClassification;

/// Number of addresses tracked when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Debug, Clone)]
struct CacheEntry {
    classification: RegionClassification,
    expires_at: Instant,
}

/// Short-lived per-address cache of successful classifications.
///
/// Shared across concurrently served requests. Holds at most `capacity`
/// addresses, evicting the least recently used; entries also expire after
/// `ttl`.
#[derive(Debug)]
pub struct ClassificationCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl ClassificationCache {
    /// Create a cache; a zero `capacity` falls back to [`DEFAULT_CAPACITY`].
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    /// Fetch a live entry for `address`, dropping it if it has expired.
    pub fn get(&self, address: &str) -> Option<RegionClassification> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        match entries.get(address) {
            Some(entry) if entry.expires_at > now => return Some(entry.classification.clone()),
            Some(_) => {}
            None => return None,
        }
        entries.pop(address);
        None
    }

    /// Store a classification. Returns `false` when the expiry cannot be
    /// represented, in which case nothing is cached.
    pub fn insert(&self, classification: RegionClassification) -> bool {
        let Some(expires_at) = Instant::now().checked_add(self.ttl) else {
            return false;
        };
        let key = classification.address.as_str().to_string();
        self.entries.lock().put(
            key,
            CacheEntry {
                classification,
                expires_at,
            },
        );
        true
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.expires_at <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ClientAddress;

    fn german(address: &str) -> RegionClassification {
        RegionClassification::new(true, Some("de".to_string()), ClientAddress::from(address))
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache = ClassificationCache::new(Duration::from_secs(60), 16);
        assert!(cache.insert(german("2.16.0.1")));

        assert_eq!(cache.get("2.16.0.1"), Some(german("2.16.0.1")));
        assert_eq!(cache.get("2.16.0.2"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entry_is_evicted_on_read() {
        let cache = ClassificationCache::new(Duration::ZERO, 16);
        cache.insert(german("2.16.0.1"));

        assert_eq!(cache.get("2.16.0.1"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let cache = ClassificationCache::new(Duration::ZERO, 16);
        cache.insert(german("2.16.0.1"));
        cache.insert(german("2.16.0.2"));

        assert_eq!(cache.purge_expired(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_size_stays_within_capacity() {
        let cache = ClassificationCache::new(Duration::from_secs(300), 64);
        for i in 0..10_000u32 {
            let address = format!("10.{}.{}.{}", i >> 16, (i >> 8) & 0xff, i & 0xff);
            cache.insert(german(&address));
            assert!(cache.len() <= 64);
        }

        assert_eq!(cache.len(), 64);
        assert!(cache.get("10.0.0.0").is_none());
        assert!(cache.get("10.0.39.15").is_some());
    }

    #[test]
    fn test_zero_capacity_uses_default() {
        let cache = ClassificationCache::new(Duration::from_secs(60), 0);
        assert_eq!(cache.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_unrepresentable_expiry_is_not_cached() {
        let cache = ClassificationCache::new(Duration::MAX, 16);

        assert!(!cache.insert(german("2.16.0.1")));
        assert!(cache.is_empty());
        assert_eq!(cache.get("2.16.0.1"), None);
    }

    #[test]
    fn test_concurrent_inserts() {
        let cache = std::sync::Arc::new(ClassificationCache::new(Duration::from_secs(60), 16));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.insert(german(&format!("2.16.0.{i}"))))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 8);
    }
}
