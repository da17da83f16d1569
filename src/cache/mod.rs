//! Time-to-live bounded result cache.
//!
//! Every external fetch in this crate goes through a [`TtlCache`]. Entries
//! expire per key (60 seconds for live indexer data, up to 12 hours for
//! price history), expired entries are recomputed on next access, and
//! concurrent lookups for the same key coalesce onto a single in-flight
//! loader instead of issuing duplicate fetches.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache;
use moka::Expiry;

use crate::error::{Error, Result};

/// Cached value wrapper carrying its own time-to-live.
#[derive(Clone)]
struct Expiring<V> {
    value: V,
    ttl: Duration,
}

/// Expiry policy that reads the TTL stored alongside each entry, so one
/// cache instance can hold entries with different lifetimes.
struct PerEntryTtl;

impl<K, V> Expiry<K, Expiring<V>> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &K,
        value: &Expiring<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Read-through cache with per-entry TTL and singleflight semantics.
///
/// Callers pass their own TTL per lookup; there is no global decoration
/// state. Loader failures are propagated to every coalesced caller and
/// are not cached, so the next access retries.
pub struct TtlCache<K, V> {
    inner: Cache<K, Expiring<V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { inner }
    }

    /// Return the cached value for `key`, or run `loader` to compute it.
    ///
    /// Concurrent calls for the same key share one loader execution.
    pub async fn get_or_compute<F>(&self, key: K, ttl: Duration, loader: F) -> Result<V>
    where
        F: Future<Output = Result<V>>,
    {
        let entry = self
            .inner
            .entry(key)
            .or_try_insert_with(async move {
                let value = loader.await?;
                Ok(Expiring { value, ttl })
            })
            .await
            .map_err(|err: Arc<Error>| (*err).clone())?;

        Ok(entry.into_value().value)
    }

    /// Number of live entries (pending expirations may be counted).
    pub fn len(&self) -> u64 {
        self.inner.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn computes_once_within_ttl() {
        let cache: TtlCache<String, u64> = TtlCache::new(100);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_compute("blocks".to_string(), Duration::from_secs(60), async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entries_are_recomputed() {
        let cache: TtlCache<String, u64> = TtlCache::new(100);
        let calls = AtomicUsize::new(0);

        let load = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        };

        cache
            .get_or_compute("status".to_string(), Duration::from_millis(50), load())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        cache
            .get_or_compute("status".to_string(), Duration::from_millis(50), load())
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_lookups_coalesce() {
        let cache: Arc<TtlCache<String, u64>> = Arc::new(TtlCache::new(100));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_compute("prices".to_string(), Duration::from_secs(60), async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(1)
                    })
                    .await
                    .unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn loader_errors_are_not_cached() {
        let cache: TtlCache<String, u64> = TtlCache::new(100);
        let calls = AtomicUsize::new(0);

        let result = cache
            .get_or_compute("ft".to_string(), Duration::from_secs(60), async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::Network("connection refused".to_string()))
            })
            .await;
        assert!(result.is_err());

        let value = cache
            .get_or_compute("ft".to_string(), Duration::from_secs(60), async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(3)
            })
            .await
            .unwrap();

        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
