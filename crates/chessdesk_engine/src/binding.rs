/* 📖 # Why are bindings trait objects collected per mount?

A documentation page does not know how a service is carried out. It gets a
`BindingSet` that maps each logical service name either to a query (a read
whose result is cached) or to a mutation (a write that returns an
`ExecutionResult`). The set is built fresh every time a page is mounted and
dropped with it; the only state that survives is whatever the bindings wrote
into the shared cache.

Resolution is a single lookup returning a tagged `Resolved`, so the
dispatcher matches on it instead of probing two maps.
*/

use std::collections::BTreeMap;
use std::sync::Arc;

use chessdesk_base::DeskResult;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::cache::CacheHandle;
use crate::query_key::QueryKey;
use crate::result::ExecutionResult;

/// Coerced endpoint arguments, keyed by parameter name.
pub type Params = Map<String, Value>;

/// Observable state of a query binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryState {
    /// Data of the last successful fetch.
    pub data: Option<Value>,
    /// Message of the last failed fetch; cleared by the next success.
    pub error: Option<String>,
    pub loading: bool,
}

/// A read operation exposed under a service name.
pub trait QueryHandle: Send + Sync {
    /// (Re-)run the query with `params` and return the settled data.
    fn trigger(&self, params: &Params) -> DeskResult<Value>;

    fn state(&self) -> QueryState;
}

/// A write operation exposed under a service name.
pub trait MutationHandle: Send + Sync {
    fn execute(&self, params: &Params) -> DeskResult<ExecutionResult>;
}

type FetchFn = dyn Fn(&Params) -> DeskResult<Value> + Send + Sync;
type ExecuteFn = dyn Fn(&Params) -> DeskResult<ExecutionResult> + Send + Sync;

/// Query backed by a closure; fetched data is cached under `key` plus the arguments.
pub struct QueryBinding {
    key: QueryKey,
    cache: CacheHandle,
    fetch: Box<FetchFn>,
    state: Mutex<QueryState>,
}

impl QueryBinding {
    pub fn new<F>(key: QueryKey, cache: CacheHandle, fetch: F) -> Self
    where
        F: Fn(&Params) -> DeskResult<Value> + Send + Sync + 'static,
    {
        Self {
            key,
            cache,
            fetch: Box::new(fetch),
            state: Mutex::new(QueryState::default()),
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

/// Clears the loading flag when a fetch settles, including by unwinding.
struct LoadingGuard<'a>(&'a Mutex<QueryState>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().loading = false;
    }
}

impl QueryHandle for QueryBinding {
    fn trigger(&self, params: &Params) -> DeskResult<Value> {
        self.state.lock().loading = true;
        let _guard = LoadingGuard(&self.state);

        match (self.fetch)(params) {
            Ok(data) => {
                let key = self.key.with_params(params);
                debug!(key = %key, "caching query result");
                self.cache.set(key, data.clone());
                let mut state = self.state.lock();
                state.data = Some(data.clone());
                state.error = None;
                Ok(data)
            }
            Err(error) => {
                self.state.lock().error = Some(error.to_string());
                Err(error)
            }
        }
    }

    fn state(&self) -> QueryState {
        self.state.lock().clone()
    }
}

impl std::fmt::Debug for QueryBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBinding").field("key", &self.key).finish()
    }
}

/// Mutation backed by a closure.
pub struct MutationBinding {
    execute: Box<ExecuteFn>,
}

impl MutationBinding {
    pub fn new<F>(execute: F) -> Self
    where
        F: Fn(&Params) -> DeskResult<ExecutionResult> + Send + Sync + 'static,
    {
        Self {
            execute: Box::new(execute),
        }
    }
}

impl MutationHandle for MutationBinding {
    fn execute(&self, params: &Params) -> DeskResult<ExecutionResult> {
        (self.execute)(params)
    }
}

/// Outcome of resolving a service name against a [`BindingSet`].
#[derive(Clone)]
pub enum Resolved {
    Mutation(Arc<dyn MutationHandle>),
    Query(Arc<dyn QueryHandle>),
    Unbound,
}

impl Resolved {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mutation(_) => "mutation",
            Self::Query(_) => "query",
            Self::Unbound => "unbound",
        }
    }
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

/// The queries and mutations a module exposes, keyed by service name.
#[derive(Clone, Default)]
pub struct BindingSet {
    queries: BTreeMap<String, Arc<dyn QueryHandle>>,
    mutations: BTreeMap<String, Arc<dyn MutationHandle>>,
}

impl BindingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, service: impl Into<String>, handle: impl QueryHandle + 'static) -> Self {
        self.queries.insert(service.into(), Arc::new(handle));
        self
    }

    pub fn mutation(
        mut self,
        service: impl Into<String>,
        handle: impl MutationHandle + 'static,
    ) -> Self {
        self.mutations.insert(service.into(), Arc::new(handle));
        self
    }

    /// Look up `service`; a mutation wins over a query bound under the same name.
    pub fn resolve(&self, service: &str) -> Resolved {
        if let Some(mutation) = self.mutations.get(service) {
            Resolved::Mutation(mutation.clone())
        } else if let Some(query) = self.queries.get(service) {
            Resolved::Query(query.clone())
        } else {
            Resolved::Unbound
        }
    }

    /// Last observed state of the query bound to `service`.
    pub fn query_state(&self, service: &str) -> Option<QueryState> {
        self.queries.get(service).map(|query| query.state())
    }

    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.mutations
            .keys()
            .chain(self.queries.keys())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.queries.len() + self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for BindingSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingSet")
            .field("queries", &self.queries.keys().collect::<Vec<_>>())
            .field("mutations", &self.mutations.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::QueryClient;
    use chessdesk_base::err;
    use serde_json::json;

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_resolve_prefers_mutations() {
        let cache = CacheHandle::new(QueryClient::new());
        let bindings = BindingSet::new()
            .query(
                "sync",
                QueryBinding::new(QueryKey::new(["x", "sync"]), cache, |_| Ok(json!(1))),
            )
            .mutation(
                "sync",
                MutationBinding::new(|_| Ok(ExecutionResult::success("ok", Value::Null))),
            );

        assert!(matches!(bindings.resolve("sync"), Resolved::Mutation(_)));
        assert!(matches!(bindings.resolve("other"), Resolved::Unbound));
        assert_eq!(bindings.len(), 2);
    }

    #[test]
    fn test_query_caches_under_argument_key() {
        let cache = CacheHandle::new(QueryClient::new());
        let query = QueryBinding::new(
            QueryKey::new(["students", "search"]),
            cache.clone(),
            |params| Ok(json!({"echo": params.clone()})),
        );

        let data = query.trigger(&params(json!({"query": "anna"}))).unwrap();
        assert_eq!(data, json!({"echo": {"query": "anna"}}));

        let key = QueryKey::new(["students", "search", r#"{"query":"anna"}"#]);
        assert_eq!(cache.fresh(&key), Some(data.clone()));
        assert_eq!(
            query.state(),
            QueryState {
                data: Some(data),
                error: None,
                loading: false
            }
        );
    }

    #[test]
    fn test_failed_query_records_error_and_settles() {
        let cache = CacheHandle::new(QueryClient::new());
        let query = QueryBinding::new(QueryKey::new(["lessons", "getAll"]), cache.clone(), |_| {
            Err(err!("store offline"))
        });

        let error = query.trigger(&Params::new()).unwrap_err();
        assert_eq!(error.to_string(), "store offline");

        let state = query.state();
        assert_eq!(state.error.as_deref(), Some("store offline"));
        assert!(!state.loading);
        assert!(cache.is_empty());
    }
}
