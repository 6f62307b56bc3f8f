/* 📖 # Why a RecordStore trait?

The domain bindings need somewhere to keep students, classes, payments and the
rest. They only ever do collection-level CRUD on JSON records, so that is all
the trait offers. The console ships an in-memory implementation; anything that
can store JSON objects under generated ids could stand in for it without the
bindings noticing.

Records are JSON objects. The store owns the `id` field: it is assigned on
insert and cannot be changed by an update.
*/

use std::sync::Arc;

use chessdesk_base::DeskResult;
use parking_lot::RwLock;
use serde_json::{Map, Value};

/// A stored JSON object.
pub type Record = Map<String, Value>;

/// Collections of JSON records with store-assigned ids.
pub trait RecordStore: Send + Sync + 'static {
    /// Store `record` in `collection` under a newly generated id.
    ///
    /// Returns the stored record, including its `id`.
    fn insert(&mut self, collection: &str, record: Record) -> DeskResult<Record>;

    fn get(&self, collection: &str, id: &str) -> DeskResult<Option<Record>>;

    /// Every record of `collection`, in insertion order.
    fn list(&self, collection: &str) -> DeskResult<Vec<Record>>;

    /// Merge `patch` into the record; `Ok(None)` if there is no such record.
    fn update(&mut self, collection: &str, id: &str, patch: Record) -> DeskResult<Option<Record>>;

    fn remove(&mut self, collection: &str, id: &str) -> DeskResult<Option<Record>>;

    /// Number of records in `collection`.
    fn len(&self, collection: &str) -> DeskResult<usize>;

    fn clear(&mut self) -> DeskResult<()>;
}

/// Thread-safe handle to a record store, shared by every binding.
#[derive(Clone)]
pub struct RecordStoreHandle(Arc<RwLock<dyn RecordStore>>);

impl RecordStoreHandle {
    pub fn new<S: RecordStore>(store: S) -> Self {
        Self(Arc::new(RwLock::new(store)))
    }

    /// See [`RecordStore::insert`].
    pub fn insert(&self, collection: &str, record: Record) -> DeskResult<Record> {
        self.0.write().insert(collection, record)
    }

    pub fn get(&self, collection: &str, id: &str) -> DeskResult<Option<Record>> {
        self.0.read().get(collection, id)
    }

    pub fn list(&self, collection: &str) -> DeskResult<Vec<Record>> {
        self.0.read().list(collection)
    }

    /// Records of `collection` for which `predicate` holds.
    pub fn find(
        &self,
        collection: &str,
        predicate: impl Fn(&Record) -> bool,
    ) -> DeskResult<Vec<Record>> {
        Ok(self
            .list(collection)?
            .into_iter()
            .filter(|record| predicate(record))
            .collect())
    }

    /// See [`RecordStore::update`].
    pub fn update(&self, collection: &str, id: &str, patch: Record) -> DeskResult<Option<Record>> {
        self.0.write().update(collection, id, patch)
    }

    pub fn remove(&self, collection: &str, id: &str) -> DeskResult<Option<Record>> {
        self.0.write().remove(collection, id)
    }

    pub fn len(&self, collection: &str) -> DeskResult<usize> {
        self.0.read().len(collection)
    }

    pub fn clear(&self) -> DeskResult<()> {
        self.0.write().clear()
    }
}

impl std::fmt::Debug for RecordStoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RecordStoreHandle")
    }
}

/// The `id` of a record, if it has a string one.
pub fn record_id(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}
