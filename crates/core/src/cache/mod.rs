//! Process-wide TTL cache (§5, §9): backs provider token caches and
//! online-DB refiner memoization. Explicit construction and injection,
//! never a global singleton — grounded on the same `RwLock<HashMap<...>>`
//! shape the pool uses for its discard set, scoped to reads-are-lock-free,
//! writes-take-a-short-critical-section.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// A key-value store with per-entry TTL. Cache misses (absent or expired
/// entries) degrade to recomputation by the caller, never to failure.
pub struct TtlCache<K, V> {
    entries: Arc<RwLock<HashMap<K, Entry<V>>>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// `None` on a miss or an expired entry; does not evict the entry on a
    /// stale read (the next `set` overwrites it).
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries.get(key).and_then(|entry| {
            if entry.expires_at > Instant::now() {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    pub async fn set(&self, key: K, value: V) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            Entry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub async fn invalidate(&self, key: &K) {
        self.entries.write().await.remove(key);
    }

    /// Remove every entry whose TTL has elapsed. Not required for
    /// correctness (stale entries are ignored on read) but keeps long-lived
    /// processes from accumulating dead entries indefinitely.
    pub async fn evict_expired(&self) {
        let now = Instant::now();
        self.entries.write().await.retain(|_, entry| entry.expires_at > now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache: TtlCache<String, String> = TtlCache::new(Duration::from_secs(60));
        cache.set("imdb:man-of-steel".to_string(), "tt0770828".to_string()).await;
        assert_eq!(cache.get(&"imdb:man-of-steel".to_string()).await.as_deref(), Some("tt0770828"));
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let cache: TtlCache<String, String> = TtlCache::new(Duration::from_secs(60));
        assert_eq!(cache.get(&"missing".to_string()).await, None);
    }

    #[tokio::test]
    async fn expired_entry_reads_as_miss() {
        let cache: TtlCache<String, String> = TtlCache::new(Duration::from_millis(1));
        cache.set("k".to_string(), "v".to_string()).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(cache.get(&"k".to_string()).await, None);
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache: TtlCache<String, String> = TtlCache::new(Duration::from_secs(60));
        cache.set("k".to_string(), "v".to_string()).await;
        cache.invalidate(&"k".to_string()).await;
        assert_eq!(cache.get(&"k".to_string()).await, None);
    }

    #[tokio::test]
    async fn evict_expired_drops_stale_entries_only() {
        let cache: TtlCache<String, String> = TtlCache::new(Duration::from_millis(1));
        cache.set("stale".to_string(), "v".to_string()).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.set("fresh".to_string(), "v".to_string()).await;
        cache.evict_expired().await;

        assert_eq!(cache.get(&"fresh".to_string()).await.as_deref(), Some("v"));
    }
}
