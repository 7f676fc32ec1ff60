//! Query cache
//!
//! In-memory, type-safe caching layer keyed by resource + filter
//! parameters, with:
//! - automatic serialization/deserialization via serde
//! - per-entry TTL
//! - prefix-based invalidation after mutations
//! - stale-while-revalidate: a TTL-expired entry keeps serving its last
//!   value while a single background refetch replaces it
//!
//! Invalidation is stronger than expiry: an invalidated entry is never
//! served and the next access waits for a fresh fetch.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone)]
struct CacheEntry {
    data: String,
    stored_at: Instant,
    ttl: Duration,
    invalidated: bool,
    refreshing: bool,
    /// Bumped on every store and every invalidation. A background
    /// refresh only lands if the entry's generation is still the one it
    /// was spawned against.
    generation: u64,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        !self.invalidated && now.duration_since(self.stored_at) < self.ttl
    }
}

enum Lookup {
    Fresh(String),
    /// Expired entry still worth showing; `refresh` says whether this
    /// caller won the right to refresh it, `generation` is the entry
    /// state the refresh was decided against.
    Stale {
        data: String,
        refresh: bool,
        generation: u64,
    },
    Miss,
}

/// Process-local cache of server responses.
///
/// Cheap to clone; all clones share the same entries.
#[derive(Clone, Default)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    generation: Arc<AtomicU64>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a fresh value from cache. Expired or invalidated entries are
    /// treated as misses here.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if !entry.is_fresh(Instant::now()) {
            debug!(key = key, "cache miss (expired)");
            return None;
        }
        match serde_json::from_str(&entry.data) {
            Ok(value) => {
                debug!(key = key, "cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key = key, error = %e, "failed to deserialize cached value");
                None
            }
        }
    }

    /// Store a value with the given TTL, replacing any previous entry.
    pub fn set_with_ttl<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> ApiResult<()> {
        let data = serde_json::to_string(value)
            .map_err(|e| ApiError::Internal(anyhow!("failed to serialize value for cache: {e}")))?;

        self.entries.write().insert(
            key.to_string(),
            CacheEntry {
                data,
                stored_at: Instant::now(),
                ttl,
                invalidated: false,
                refreshing: false,
                generation: self.next_generation(),
            },
        );

        debug!(key = key, ttl_secs = ttl.as_secs(), "cached value");
        Ok(())
    }

    /// Mark every entry whose key starts with `prefix` as stale. The next
    /// access with a matching key refetches instead of serving the
    /// pre-mutation value.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write();
        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) && !entry.invalidated {
                entry.invalidated = true;
                // In-flight background refreshes of the old value must
                // not land after this point
                entry.generation = self.next_generation();
                count += 1;
            }
        }
        debug!(prefix = prefix, invalidated = count, "cache invalidation");
        count
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Cached read-through.
    ///
    /// - fresh entry: returned without fetching
    /// - missing or invalidated entry: `fetcher` is awaited, the result
    ///   cached and returned
    /// - TTL-expired entry: the stale value is returned immediately and a
    ///   background refetch (single-flight per key) replaces the entry
    pub async fn fetch_with<T, F, Fut>(&self, key: &str, ttl: Duration, fetcher: F) -> ApiResult<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        let lookup = {
            let mut entries = self.entries.write();
            match entries.get_mut(key) {
                None => Lookup::Miss,
                Some(entry) if entry.invalidated => Lookup::Miss,
                Some(entry) if entry.is_fresh(Instant::now()) => Lookup::Fresh(entry.data.clone()),
                Some(entry) => {
                    let refresh = !entry.refreshing;
                    entry.refreshing = true;
                    Lookup::Stale {
                        data: entry.data.clone(),
                        refresh,
                        generation: entry.generation,
                    }
                }
            }
        };

        match lookup {
            Lookup::Fresh(data) => decode(key, &data),
            Lookup::Stale {
                data,
                refresh,
                generation,
            } => {
                if refresh {
                    self.spawn_refresh(key.to_string(), ttl, generation, fetcher());
                }
                decode(key, &data)
            }
            Lookup::Miss => {
                let value = fetcher().await?;
                self.set_with_ttl(key, &value, ttl)?;
                Ok(value)
            }
        }
    }

    fn spawn_refresh<T, Fut>(&self, key: String, ttl: Duration, generation: u64, fut: Fut)
    where
        T: Serialize + Send + 'static,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        let cache = self.clone();
        tokio::spawn(async move {
            match fut.await {
                Ok(value) => {
                    if let Err(e) = cache.store_refreshed(&key, &value, ttl, generation) {
                        warn!(key = %key, error = %e, "background refresh store failed");
                    }
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "background refresh failed");
                    let mut entries = cache.entries.write();
                    if let Some(entry) = entries.get_mut(&key) {
                        if entry.generation == generation {
                            entry.refreshing = false;
                        }
                    }
                }
            }
        });
    }

    /// Store the result of a background refresh, but only if the entry is
    /// still the one the refresh was spawned against. An invalidation or
    /// a fresh store in the meantime wins over the refetched value.
    fn store_refreshed<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
        generation: u64,
    ) -> ApiResult<()> {
        let data = serde_json::to_string(value)
            .map_err(|e| ApiError::Internal(anyhow!("failed to serialize value for cache: {e}")))?;

        let mut entries = self.entries.write();
        match entries.get_mut(key) {
            Some(entry) if entry.generation == generation => {
                *entry = CacheEntry {
                    data,
                    stored_at: Instant::now(),
                    ttl,
                    invalidated: false,
                    refreshing: false,
                    generation: self.next_generation(),
                };
                debug!(key = key, "background refresh completed");
            }
            _ => {
                debug!(key = key, "background refresh superseded, discarded");
            }
        }
        Ok(())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

fn decode<T: DeserializeOwned>(key: &str, data: &str) -> ApiResult<T> {
    serde_json::from_str(data)
        .map_err(|e| ApiError::Internal(anyhow!("corrupt cache entry for {key}: {e}")))
}

/// Cache key builders, one per query shape.
///
/// List keys embed every filter parameter so distinct filters never
/// collide; prefixes cover a whole resource for post-mutation
/// invalidation.
pub mod keys {
    use crate::domain::tasks::TaskQuery;

    pub fn task_list(query: &TaskQuery) -> String {
        let mut key = String::from("tasks:list");
        for (name, value) in query.to_query_pairs() {
            key.push(':');
            key.push_str(name);
            key.push('=');
            key.push_str(&value);
        }
        key
    }

    pub fn task(task_id: i64) -> String {
        format!("tasks:detail:{task_id}")
    }

    pub fn labels() -> String {
        "labels:list".to_string()
    }

    pub fn comments(task_id: i64) -> String {
        format!("comments:task:{task_id}")
    }

    pub fn activity() -> String {
        "activity:list".to_string()
    }

    pub fn tasks_prefix() -> &'static str {
        "tasks:"
    }

    pub fn labels_prefix() -> &'static str {
        "labels:"
    }

    pub fn comments_prefix() -> &'static str {
        "comments:"
    }

    pub fn activity_prefix() -> &'static str {
        "activity:"
    }
}
