/* 📖 # Why is the query cache a trait behind a handle?

Query results are the only state that outlives a documentation page. Bindings
write fetched data into the cache and the dispatcher invalidates it after a
mutation, so both need the same cache. Passing a `CacheHandle` explicitly, in the
same shape as the record store handle, keeps that sharing visible in every
constructor instead of hiding it in a global.
*/

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::query_key::QueryKey;

/// A cached query result.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub data: Value,
    /// Set by invalidation; a stale entry must be refetched before it is trusted.
    pub stale: bool,
}

/// Storage for query results keyed by [`QueryKey`].
pub trait QueryCache: Send + Sync + 'static {
    /// Look up the entry stored under exactly `key`.
    fn get(&self, key: &QueryKey) -> Option<CacheEntry>;

    /// Store fresh data under `key`, replacing any previous entry.
    fn set(&mut self, key: QueryKey, data: Value);

    /// Mark every entry whose key starts with `prefix` as stale.
    ///
    /// Returns the number of entries affected. The call is recorded even when
    /// no entry matches.
    fn invalidate(&mut self, prefix: &QueryKey) -> usize;

    /// Recent invalidations, oldest first; implementations may bound how many are kept.
    fn invalidations(&self) -> Vec<QueryKey>;

    /// Number of cached entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry and the invalidation log.
    fn clear(&mut self);
}

/// Thread-safe, cheaply cloneable handle to a query cache.
#[derive(Clone)]
pub struct CacheHandle(Arc<RwLock<dyn QueryCache>>);

impl CacheHandle {
    pub fn new<C: QueryCache>(cache: C) -> Self {
        Self(Arc::new(RwLock::new(cache)))
    }

    /// See [`QueryCache::get`].
    pub fn get(&self, key: &QueryKey) -> Option<CacheEntry> {
        self.0.read().get(key)
    }

    /// Fresh data under `key`, or None if missing or stale.
    pub fn fresh(&self, key: &QueryKey) -> Option<Value> {
        self.get(key).filter(|entry| !entry.stale).map(|entry| entry.data)
    }

    /// See [`QueryCache::set`].
    pub fn set(&self, key: QueryKey, data: Value) {
        self.0.write().set(key, data)
    }

    /// See [`QueryCache::invalidate`].
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        self.0.write().invalidate(prefix)
    }

    /// See [`QueryCache::invalidations`].
    pub fn invalidations(&self) -> Vec<QueryKey> {
        self.0.read().invalidations()
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn clear(&self) {
        self.0.write().clear()
    }
}

impl std::fmt::Debug for CacheHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheHandle")
            .field("entries", &self.len())
            .finish()
    }
}
