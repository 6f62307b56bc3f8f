use crate::cache::{CacheHandle, QueryClient};
use crate::session::SessionHandle;
use crate::store::{InMemoryRecordStore, RecordStoreHandle};

/// The shared handles domain bindings are built from.
#[derive(Debug, Clone)]
pub struct ConsoleContext {
    pub records: RecordStoreHandle,
    pub session: SessionHandle,
    pub cache: CacheHandle,
}

impl ConsoleContext {
    pub fn new(records: RecordStoreHandle, session: SessionHandle, cache: CacheHandle) -> Self {
        Self {
            records,
            session,
            cache,
        }
    }

    /// Empty in-memory record store, no session and an empty query cache.
    pub fn in_memory() -> Self {
        Self::new(
            RecordStoreHandle::new(InMemoryRecordStore::new()),
            SessionHandle::new(),
            CacheHandle::new(QueryClient::new()),
        )
    }
}
