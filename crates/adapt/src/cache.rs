// crates/adapt/src/cache.rs

use async_trait::async_trait;
use serde_json::Value as Json;
use serve::cache::ApiCache;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    value: Json,
    expires_at: SystemTime,
}

impl Entry {
    fn is_expired(&self) -> bool {
        SystemTime::now() > self.expires_at
    }
}

/// Process-local [`ApiCache`]. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCache {
    store: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live entries, expired ones excluded.
    pub async fn len(&self) -> usize {
        let store = self.store.read().await;
        store.values().filter(|e| !e.is_expired()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Insert with an explicit lifetime instead of whole minutes.
    pub async fn set_with_ttl(&self, key: &str, value: Json, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: SystemTime::now() + ttl,
        };
        self.store.write().await.insert(key.to_owned(), entry);
    }

    pub async fn cleanup_expired(&self) {
        let mut store = self.store.write().await;
        store.retain(|_, entry| !entry.is_expired());
    }
}

#[async_trait]
impl ApiCache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<Json> {
        let store = self.store.read().await;
        match store.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.value.clone()),
            Some(_) => {
                debug!("{} expired", key);
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: &str, value: Json, ttl_minutes: u64) {
        self.set_with_ttl(key, value, Duration::from_secs(ttl_minutes * 60))
            .await;
    }

    async fn flush(&self) {
        let mut store = self.store.write().await;
        debug!("flushing {} cache entries", store.len());
        store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serve::cache::{read_through, GLOBAL_TTL_MINUTES, INDEX_TTL_MINUTES};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn set_get_and_flush() {
        let cache = InMemoryCache::new();
        assert!(cache.get("index.en").await.is_none());

        cache.set("index.en", json!([1, 2]), INDEX_TTL_MINUTES).await;
        cache.set("global.en", json!({ "a": 1 }), GLOBAL_TTL_MINUTES).await;
        assert_eq!(cache.get("index.en").await, Some(json!([1, 2])));
        assert_eq!(cache.len().await, 2);

        cache.flush().await;
        assert!(cache.is_empty().await);
        assert!(cache.get("global.en").await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_misses() {
        let cache = InMemoryCache::new();
        cache
            .set_with_ttl("index.de", json!("old"), Duration::from_millis(10))
            .await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get("index.de").await.is_none());

        cache.cleanup_expired().await;
        assert_eq!(cache.store.read().await.len(), 0);
    }

    #[tokio::test]
    async fn read_through_computes_once_until_flushed() {
        let cache = InMemoryCache::new();
        let computed = AtomicUsize::new(0);
        let compute = || {
            computed.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "n": 1 }))
        };

        let first = read_through(&cache, "global.en", GLOBAL_TTL_MINUTES, compute).await.unwrap();
        let second = read_through(&cache, "global.en", GLOBAL_TTL_MINUTES, compute).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(computed.load(Ordering::SeqCst), 1);

        cache.flush().await;
        read_through(&cache, "global.en", GLOBAL_TTL_MINUTES, compute).await.unwrap();
        assert_eq!(computed.load(Ordering::SeqCst), 2);
    }
}
