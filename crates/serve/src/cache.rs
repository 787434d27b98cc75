// crates/serve/src/cache.rs

//! Read-through API cache contract.
//!
//! Entries are keyed `"<namespace>.<language code>"` (`default` on
//! single-language sites) and expire after a fixed TTL. Invalidation is all
//! or nothing: any content change flushes the whole cache.

use crate::Result;
use async_trait::async_trait;
use domain::model::Language;
use serde_json::Value as Json;
use tracing::debug;

pub const INDEX_NAMESPACE: &str = "index";
pub const GLOBAL_NAMESPACE: &str = "global";

/// Seven days.
pub const INDEX_TTL_MINUTES: u64 = 10_080;
/// Thirty days.
pub const GLOBAL_TTL_MINUTES: u64 = 43_200;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Json>;

    async fn set(&self, key: &str, value: Json, ttl_minutes: u64);

    /// Drop every entry.
    async fn flush(&self);
}

pub fn cache_key(namespace: &str, lang: Option<&Language>) -> String {
    let code = lang.map(|l| l.code.as_str()).unwrap_or("default");
    format!("{namespace}.{code}")
}

/// Return the cached value for `key`, or compute, store and return it.
///
/// Concurrent misses may both compute; the last `set` wins. Compute errors
/// are returned and nothing is stored.
#[tracing::instrument(skip_all, fields(key = %key))]
pub async fn read_through<F>(
    cache: &dyn ApiCache,
    key: &str,
    ttl_minutes: u64,
    compute: F,
) -> Result<Json>
where
    F: FnOnce() -> Result<Json>,
{
    if let Some(hit) = cache.get(key).await {
        debug!("cache hit");
        return Ok(hit);
    }
    debug!("cache miss");
    let value = compute()?;
    cache.set(key, value.clone(), ttl_minutes).await;
    Ok(value)
}
