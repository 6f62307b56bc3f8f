use std::collections::{BTreeMap, VecDeque};

use serde_json::Value;
use tracing::debug;

use crate::cache::traits::{CacheEntry, QueryCache};
use crate::query_key::QueryKey;

/// Invalidations remembered by a [`QueryClient`].
pub const INVALIDATION_LOG_CAPACITY: usize = 256;

/// In-memory query cache.
///
/// Entries live in a `BTreeMap`, so all keys sharing a prefix are adjacent; that
/// is what prefix invalidation walks. Stale entries are dropped on the next
/// `set`, and only the latest [`INVALIDATION_LOG_CAPACITY`] invalidations are
/// kept.
///
/// ```
/// use chessdesk_engine::{CacheHandle, QueryClient, QueryKey};
/// use serde_json::json;
///
/// let cache = CacheHandle::new(QueryClient::new());
/// cache.set(QueryKey::new(["students", "getAll"]), json!([]));
/// assert_eq!(cache.invalidate(&QueryKey::new(["students"])), 1);
/// assert!(cache.fresh(&QueryKey::new(["students", "getAll"])).is_none());
/// ```
#[derive(Debug, Default)]
pub struct QueryClient {
    entries: BTreeMap<QueryKey, CacheEntry>,
    stale: usize,
    invalidations: VecDeque<QueryKey>,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QueryCache for QueryClient {
    fn get(&self, key: &QueryKey) -> Option<CacheEntry> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: QueryKey, data: Value) {
        if self.stale > 0 {
            let before = self.entries.len();
            self.entries.retain(|_, entry| !entry.stale);
            debug!(evicted = before - self.entries.len(), "evicted stale queries");
            self.stale = 0;
        }
        self.entries.insert(key, CacheEntry { data, stale: false });
    }

    fn invalidate(&mut self, prefix: &QueryKey) -> usize {
        let mut affected = 0;
        for entry in self
            .entries
            .range_mut(prefix.clone()..)
            .take_while(|(key, _)| prefix.covers(key))
            .map(|(_, entry)| entry)
        {
            if !entry.stale {
                entry.stale = true;
                self.stale += 1;
            }
            affected += 1;
        }
        debug!(key = %prefix, affected, "invalidated queries");
        if self.invalidations.len() == INVALIDATION_LOG_CAPACITY {
            self.invalidations.pop_front();
        }
        self.invalidations.push_back(prefix.clone());
        affected
    }

    fn invalidations(&self) -> Vec<QueryKey> {
        self.invalidations.iter().cloned().collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.stale = 0;
        self.invalidations.clear();
    }
}
