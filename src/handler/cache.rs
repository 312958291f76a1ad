//! Time-bounded cache
//!
//! Entries expire a fixed time after insertion. There is no single-flight
//! guarantee: callers that miss at the same time each run their populate
//! future, and the last one to finish wins.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

#[derive(Clone)]
struct CachedEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CachedEntry<V> {
    fn is_valid(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Shared map whose entries expire after `ttl`
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<K, CachedEntry<V>>>>,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            ttl: self.ttl,
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Value for `key` if present and not expired
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_valid(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    /// Store `value`, dropping any entries that have expired
    pub async fn insert(&self, key: K, value: V) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.is_valid(now));
        entries.insert(
            key,
            CachedEntry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Return the cached value or run `populate` and cache its result.
    ///
    /// Errors are returned to the caller and not cached.
    pub async fn get_or_populate<F, Fut, E>(&self, key: K, populate: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }

        // Lock is not held while populating
        let value = populate().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.is_valid(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn populate_counting(calls: &AtomicUsize) -> Result<usize, String> {
        Ok(calls.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl_and_refetch_after() {
        let cache: TtlCache<&str, usize> = TtlCache::new(Duration::from_secs(30));
        let calls = AtomicUsize::new(0);

        let first = cache.get_or_populate("space!token", || populate_counting(&calls)).await;
        tokio::time::advance(Duration::from_secs(29)).await;
        let second = cache.get_or_populate("space!token", || populate_counting(&calls)).await;

        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        let third = cache.get_or_populate("space!token", || populate_counting(&calls)).await;
        assert_eq!(third, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let cache: TtlCache<(String, String), usize> = TtlCache::new(Duration::from_secs(30));
        let calls = AtomicUsize::new(0);

        let key_a = ("space".to_string(), "token-a".to_string());
        let key_b = ("space".to_string(), "token-b".to_string());
        cache.get_or_populate(key_a.clone(), || populate_counting(&calls)).await.unwrap();
        cache.get_or_populate(key_b, || populate_counting(&calls)).await.unwrap();
        cache.get_or_populate(key_a, || populate_counting(&calls)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_are_not_cached() {
        let cache: TtlCache<&str, usize> = TtlCache::new(Duration::from_secs(30));

        let failed: Result<usize, String> = cache
            .get_or_populate("key", || async { Err("upstream down".to_string()) })
            .await;
        assert!(failed.is_err());
        assert!(cache.is_empty().await);

        let recovered: Result<usize, String> = cache.get_or_populate("key", || async { Ok(7) }).await;
        assert_eq!(recovered, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_purges_expired_entries() {
        let cache: TtlCache<u32, u32> = TtlCache::new(Duration::from_secs(1));
        cache.insert(1, 1).await;
        tokio::time::advance(Duration::from_secs(2)).await;
        cache.insert(2, 2).await;

        assert!(cache.get(&1).await.is_none());
        assert_eq!(cache.entries.read().await.len(), 1);
    }
}
