use std::collections::BTreeMap;

use chessdesk_base::DeskResult;
use serde_json::Value;

use crate::store::traits::{Record, RecordStore};

#[derive(Debug, Default)]
struct Collection {
    /// Number of ids handed out so far; ids are never reused.
    issued: u32,
    records: BTreeMap<String, Record>,
}

/// In-memory record store.
///
/// Ids are `<collection>-<n>` with `n` zero-padded to four digits, so the
/// `BTreeMap` order of a collection is its insertion order.
///
/// ```
/// use chessdesk_engine::{InMemoryRecordStore, RecordStore};
/// use serde_json::json;
///
/// let mut store = InMemoryRecordStore::new();
/// let record = json!({"name": "Beginners A"}).as_object().unwrap().clone();
/// let stored = store.insert("classes", record).unwrap();
/// assert_eq!(stored["id"], "classes-0001");
/// assert_eq!(store.len("classes").unwrap(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    collections: BTreeMap<String, Collection>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn insert(&mut self, collection: &str, mut record: Record) -> DeskResult<Record> {
        let entries = self.collections.entry(collection.to_string()).or_default();
        entries.issued += 1;
        let id = format!("{}-{:04}", collection, entries.issued);
        record.insert("id".to_string(), Value::from(id.as_str()));
        entries.records.insert(id, record.clone());
        Ok(record)
    }

    fn get(&self, collection: &str, id: &str) -> DeskResult<Option<Record>> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|entries| entries.records.get(id))
            .cloned())
    }

    fn list(&self, collection: &str) -> DeskResult<Vec<Record>> {
        Ok(self
            .collections
            .get(collection)
            .map(|entries| entries.records.values().cloned().collect())
            .unwrap_or_default())
    }

    fn update(&mut self, collection: &str, id: &str, patch: Record) -> DeskResult<Option<Record>> {
        let Some(record) = self
            .collections
            .get_mut(collection)
            .and_then(|entries| entries.records.get_mut(id))
        else {
            return Ok(None);
        };
        for (field, value) in patch {
            if field != "id" {
                record.insert(field, value);
            }
        }
        Ok(Some(record.clone()))
    }

    fn remove(&mut self, collection: &str, id: &str) -> DeskResult<Option<Record>> {
        Ok(self
            .collections
            .get_mut(collection)
            .and_then(|entries| entries.records.remove(id)))
    }

    fn len(&self, collection: &str) -> DeskResult<usize> {
        Ok(self
            .collections
            .get(collection)
            .map_or(0, |entries| entries.records.len()))
    }

    fn clear(&mut self) -> DeskResult<()> {
        self.collections.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_store_new() {
        let store = InMemoryRecordStore::new();
        assert_eq!(store.len("students").unwrap(), 0);
        assert!(store.list("students").unwrap().is_empty());
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let mut store = InMemoryRecordStore::new();
        let first = store.insert("students", record(json!({"name": "Anna"}))).unwrap();
        let second = store.insert("students", record(json!({"name": "Ben"}))).unwrap();
        let class = store.insert("classes", record(json!({"name": "A"}))).unwrap();

        assert_eq!(first["id"], "students-0001");
        assert_eq!(second["id"], "students-0002");
        assert_eq!(class["id"], "classes-0001");
        assert_eq!(
            store.get("students", "students-0002").unwrap(),
            Some(second)
        );
    }

    #[test]
    fn test_insert_overrides_caller_id() {
        let mut store = InMemoryRecordStore::new();
        let stored = store
            .insert("lessons", record(json!({"id": "mine", "title": "Pins"})))
            .unwrap();
        assert_eq!(stored["id"], "lessons-0001");
        assert!(store.get("lessons", "mine").unwrap().is_none());
    }

    #[test]
    fn test_list_in_insertion_order() {
        let mut store = InMemoryRecordStore::new();
        for name in ["c", "a", "b"] {
            store.insert("students", record(json!({"name": name}))).unwrap();
        }
        let names: Vec<Value> = store
            .list("students")
            .unwrap()
            .into_iter()
            .map(|record| record["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("c"), json!("a"), json!("b")]);
    }

    #[test]
    fn test_update_merges_and_keeps_id() {
        let mut store = InMemoryRecordStore::new();
        store
            .insert("students", record(json!({"name": "Anna", "rating": 1200})))
            .unwrap();

        let updated = store
            .update(
                "students",
                "students-0001",
                record(json!({"rating": 1350, "id": "students-9999"})),
            )
            .unwrap()
            .unwrap();
        assert_eq!(
            Value::Object(updated),
            json!({"id": "students-0001", "name": "Anna", "rating": 1350})
        );

        assert!(store.update("students", "students-0042", Record::new()).unwrap().is_none());
    }

    #[test]
    fn test_remove_does_not_reuse_ids() {
        let mut store = InMemoryRecordStore::new();
        store.insert("classes", record(json!({"name": "A"}))).unwrap();
        let removed = store.remove("classes", "classes-0001").unwrap();
        assert_eq!(removed.map(|record| record["name"].clone()), Some(json!("A")));
        assert!(store.remove("classes", "classes-0001").unwrap().is_none());

        let next = store.insert("classes", record(json!({"name": "B"}))).unwrap();
        assert_eq!(next["id"], "classes-0002");
    }

    #[test]
    fn test_clear() {
        let mut store = InMemoryRecordStore::new();
        store.insert("users", record(json!({"username": "admin"}))).unwrap();
        store.clear().unwrap();
        assert_eq!(store.len("users").unwrap(), 0);
    }
}
