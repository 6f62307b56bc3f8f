/* 📖 # Why do most domain modules share one set of bindings?

Classes, students, tuition payments, lessons, users and attendance marks are
all records in a collection, read and written the same way: list, fetch by
id, filter by a field, search, create, update and delete. `Collection`
describes one such collection (store name, label for messages, query keys and
fields that must never leave the store) and builds the matching bindings, so a
domain module only has to declare its tables and pick which operations it
exposes.

Authentication is the exception and has its own bindings.
*/

pub mod attendance;
pub mod auth;
pub mod class;
pub mod lesson;
pub mod student;
pub mod tuition;
pub mod user;

use chessdesk_base::{DeskResult, bail};
use serde_json::Value;
use tracing::debug;

use crate::binding::{MutationBinding, Params, QueryBinding};
use crate::context::ConsoleContext;
use crate::registry::{ModuleSpec, QueryKeyTable};
use crate::result::ExecutionResult;
use crate::store::Record;

/// Error code of a result for an id that does not exist.
pub const NOT_FOUND: &str = "NOT_FOUND";

/// Every domain module, in menu order.
pub static MODULES: [&ModuleSpec; 7] = [
    &auth::MODULE,
    &class::MODULE,
    &student::MODULE,
    &tuition::MODULE,
    &lesson::MODULE,
    &user::MODULE,
    &attendance::MODULE,
];

/// A record collection and the bindings built on it.
#[derive(Debug, Clone, Copy)]
pub struct Collection {
    /// Name of the collection in the record store.
    pub name: &'static str,
    /// Singular label used in result messages.
    pub label: &'static str,
    pub query_keys: QueryKeyTable,
    /// Fields stripped from every record handed out.
    pub hidden: &'static [&'static str],
}

impl Collection {
    /// Every record.
    pub fn list(self, context: &ConsoleContext, service: &str) -> QueryBinding {
        let records = context.records.clone();
        QueryBinding::new(
            self.query_keys.lookup(service),
            context.cache.clone(),
            move |_| {
                let found = records.list(self.name)?;
                Ok(self.visible_all(found))
            },
        )
    }

    /// The record named by the `id` parameter; a missing record is a `NOT_FOUND` result.
    pub fn by_id(self, context: &ConsoleContext, service: &str) -> QueryBinding {
        let records = context.records.clone();
        QueryBinding::new(
            self.query_keys.lookup(service),
            context.cache.clone(),
            move |params| {
                let id = require_str(params, "id")?;
                Ok(match records.get(self.name, &id)? {
                    Some(record) => self.visible(record),
                    None => self.not_found().to_value(),
                })
            },
        )
    }

    /// Records matching every given parameter among `fields` exactly.
    pub fn filter(
        self,
        context: &ConsoleContext,
        service: &str,
        fields: &'static [&'static str],
    ) -> QueryBinding {
        let records = context.records.clone();
        QueryBinding::new(
            self.query_keys.lookup(service),
            context.cache.clone(),
            move |params| {
                let wanted: Vec<(&str, &Value)> = fields
                    .iter()
                    .filter_map(|field| {
                        params
                            .get(*field)
                            .filter(|value| !value.is_null())
                            .map(|value| (*field, value))
                    })
                    .collect();
                let found = records.find(self.name, |record| {
                    wanted
                        .iter()
                        .all(|(field, value)| record.get(*field) == Some(*value))
                })?;
                Ok(self.visible_all(found))
            },
        )
    }

    /// Records where any of `fields` contains the `query` parameter, ignoring case.
    pub fn search(
        self,
        context: &ConsoleContext,
        service: &str,
        fields: &'static [&'static str],
    ) -> QueryBinding {
        let records = context.records.clone();
        QueryBinding::new(
            self.query_keys.lookup(service),
            context.cache.clone(),
            move |params| {
                let needle = optional_str(params, "query").unwrap_or_default().to_lowercase();
                let found = records.find(self.name, |record| {
                    fields.iter().any(|field| {
                        record
                            .get(*field)
                            .and_then(Value::as_str)
                            .is_some_and(|text| text.to_lowercase().contains(&needle))
                    })
                })?;
                Ok(self.visible_all(found))
            },
        )
    }

    /// Store all parameters as a new record.
    pub fn create(self, context: &ConsoleContext) -> MutationBinding {
        let records = context.records.clone();
        MutationBinding::new(move |params| {
            let stored = records.insert(self.name, params.clone())?;
            debug!(collection = self.name, id = ?stored.get("id"), "created record");
            Ok(ExecutionResult::success(
                format!("{} created successfully", self.label),
                self.visible(stored),
            ))
        })
    }

    /// Merge the `data` object parameter into the record named by `id`.
    pub fn update(self, context: &ConsoleContext) -> MutationBinding {
        let records = context.records.clone();
        MutationBinding::new(move |params| {
            let id = require_str(params, "id")?;
            let patch = require_object(params, "data")?;
            Ok(match records.update(self.name, &id, patch)? {
                Some(updated) => ExecutionResult::success(
                    format!("{} updated successfully", self.label),
                    self.visible(updated),
                ),
                None => self.not_found(),
            })
        })
    }

    /// Remove the record named by `id`.
    pub fn delete(self, context: &ConsoleContext) -> MutationBinding {
        let records = context.records.clone();
        MutationBinding::new(move |params| {
            let id = require_str(params, "id")?;
            Ok(match records.remove(self.name, &id)? {
                Some(_) => ExecutionResult::success(
                    format!("{} deleted successfully", self.label),
                    serde_json::json!({ "id": id }),
                ),
                None => self.not_found(),
            })
        })
    }

    fn not_found(&self) -> ExecutionResult {
        ExecutionResult::failure(NOT_FOUND, format!("{} not found", self.label))
    }

    fn visible(&self, mut record: Record) -> Value {
        for field in self.hidden {
            record.remove(*field);
        }
        Value::Object(record)
    }

    fn visible_all(&self, records: Vec<Record>) -> Value {
        Value::Array(records.into_iter().map(|record| self.visible(record)).collect())
    }
}

/// A string parameter; numbers are accepted in their decimal form.
pub fn optional_str(params: &Params, name: &str) -> Option<String> {
    match params.get(name)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

pub fn require_str(params: &Params, name: &str) -> DeskResult<String> {
    match optional_str(params, name) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => bail!("Missing required parameter '{}'", name),
    }
}

pub fn require_object(params: &Params, name: &str) -> DeskResult<Record> {
    match params.get(name) {
        Some(Value::Object(object)) => Ok(object.clone()),
        _ => bail!("Parameter '{}' must be a JSON object", name),
    }
}
