/* 📖 # Why does the dispatcher catch panics?

The dispatcher is the boundary between the documentation page and code it does
not control. Whatever a binding does (return data, return an error, panic) the
page must end up with an `ExecutionResult` it can render. Errors are mapped by
message; a panic is caught with `catch_unwind` and mapped the same way, using
the panic payload when it is a string and the generic fallback otherwise.

After a mutation settles, whichever way it settled, the mutation's query key is
invalidated exactly once so the reads it affected refetch. Queries never
invalidate anything.
*/

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use chessdesk_base::DeskResult;
use tracing::{debug, instrument, warn};

use crate::binding::{BindingSet, Params, Resolved};
use crate::cache::CacheHandle;
use crate::endpoint::EndpointDescriptor;
use crate::query_key::QueryKey;
use crate::result::ExecutionResult;

/// Resolves endpoints against a binding set and runs them.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    cache: CacheHandle,
}

impl Dispatcher {
    pub fn new(cache: CacheHandle) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &CacheHandle {
        &self.cache
    }

    /// Execute `endpoint` with `params`; never fails and never panics.
    ///
    /// An empty `invalidation_key` means there is nothing to invalidate.
    #[instrument(skip_all, fields(service = endpoint.service))]
    pub fn handle_execute(
        &self,
        endpoint: &EndpointDescriptor,
        params: &Params,
        bindings: &BindingSet,
        invalidation_key: &QueryKey,
    ) -> ExecutionResult {
        let resolved = bindings.resolve(endpoint.service);
        debug!(kind = resolved.kind(), "resolved service");
        match resolved {
            Resolved::Mutation(mutation) => {
                let outcome = settle(|| mutation.execute(params));
                if !invalidation_key.is_empty() {
                    self.cache.invalidate(invalidation_key);
                }
                match outcome {
                    Ok(result) => result,
                    Err(message) => {
                        warn!(%message, "mutation failed");
                        ExecutionResult::api_error(message)
                    }
                }
            }
            Resolved::Query(query) => match settle(|| query.trigger(params)) {
                Ok(data) => ExecutionResult::from_query_data(data),
                Err(message) => {
                    warn!(%message, "query failed");
                    ExecutionResult::api_error(message)
                }
            },
            Resolved::Unbound => {
                warn!("no query or mutation bound to service");
                ExecutionResult::invalid_endpoint()
            }
        }
    }
}

/// Run a binding call, turning errors and panics into their message.
fn settle<T>(call: impl FnOnce() -> DeskResult<T>) -> Result<T, String> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(error.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

/// The panic payload as text; empty when it is not a string.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{MutationBinding, QueryBinding};
    use crate::cache::QueryClient;
    use crate::endpoint::ParameterSpec;
    use crate::result::{API_ERROR, INVALID_ENDPOINT, UNKNOWN_ERROR_MESSAGE};
    use chessdesk_base::err;
    use chessdesk_base::pal::http::HttpMethod;
    use parking_lot::Mutex;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const LOGIN: EndpointDescriptor = EndpointDescriptor::new(
        HttpMethod::Post,
        "login",
        "Log in",
        &[
            ParameterSpec::string("username", "Login name").required(),
            ParameterSpec::string("password", "Password").required(),
        ],
    );
    const GET_ALL: EndpointDescriptor =
        EndpointDescriptor::new(HttpMethod::Get, "getAllStudents", "List students", &[]);
    const MISSING: EndpointDescriptor =
        EndpointDescriptor::new(HttpMethod::Get, "doesNotExist", "Unbound", &[]);

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn seeded_cache() -> CacheHandle {
        let cache = CacheHandle::new(QueryClient::new());
        cache.set(QueryKey::new(["auth", "currentUser"]), json!(null));
        cache.set(QueryKey::new(["students", "getAll"]), json!([]));
        cache
    }

    /// Mutation that records every call and returns what `respond` yields.
    fn recording_mutation(
        calls: Arc<Mutex<Vec<Params>>>,
        respond: impl Fn() -> DeskResult<ExecutionResult> + Send + Sync + 'static,
    ) -> MutationBinding {
        MutationBinding::new(move |params| {
            calls.lock().push(params.clone());
            respond()
        })
    }

    #[test]
    fn test_mutation_runs_once_then_invalidates_once() {
        let cache = seeded_cache();
        let calls = Arc::new(Mutex::new(vec![]));
        let bindings = BindingSet::new().mutation(
            "login",
            recording_mutation(calls.clone(), || {
                Ok(ExecutionResult::success("Login successful", json!({"username": "admin"})))
            }),
        );
        let input = params(json!({"username": "admin", "password": "Pass123@"}));

        let result = Dispatcher::new(cache.clone()).handle_execute(
            &LOGIN,
            &input,
            &bindings,
            &QueryKey::new(["auth"]),
        );

        assert_eq!(
            result,
            ExecutionResult::success("Login successful", json!({"username": "admin"}))
        );
        assert_eq!(*calls.lock(), vec![input]);
        assert_eq!(cache.invalidations(), vec![QueryKey::new(["auth"])]);
        assert!(cache.get(&QueryKey::new(["auth", "currentUser"])).unwrap().stale);
        assert!(!cache.get(&QueryKey::new(["students", "getAll"])).unwrap().stale);
    }

    #[test]
    fn test_failed_mutation_still_invalidates() {
        let cache = seeded_cache();
        let calls = Arc::new(Mutex::new(vec![]));
        let bindings =
            BindingSet::new().mutation("login", recording_mutation(calls.clone(), || Err(err!("boom"))));

        let result = Dispatcher::new(cache.clone()).handle_execute(
            &LOGIN,
            &Params::new(),
            &bindings,
            &QueryKey::new(["auth"]),
        );

        assert_eq!(result, ExecutionResult::failure(API_ERROR, "boom"));
        assert_eq!(calls.lock().len(), 1);
        assert_eq!(cache.invalidations().len(), 1);
    }

    #[test]
    fn test_business_failure_passes_through() {
        let cache = seeded_cache();
        let bindings = BindingSet::new().mutation(
            "login",
            MutationBinding::new(|_| {
                Ok(ExecutionResult::failure("LOGOUT_ERROR", "Failed to logout"))
            }),
        );
        let result = Dispatcher::new(cache).handle_execute(
            &LOGIN,
            &Params::new(),
            &bindings,
            &QueryKey::new(["auth"]),
        );
        assert_eq!(result.error_code(), Some("LOGOUT_ERROR"));
        assert_eq!(result.message(), "Failed to logout");
    }

    #[test]
    fn test_panics_are_normalized() {
        let cache = seeded_cache();
        let dispatcher = Dispatcher::new(cache.clone());
        let key = QueryKey::new(["auth"]);

        let with_message = BindingSet::new()
            .mutation("login", MutationBinding::new(|_| panic!("boom")));
        assert_eq!(
            dispatcher.handle_execute(&LOGIN, &Params::new(), &with_message, &key),
            ExecutionResult::failure(API_ERROR, "boom")
        );

        let without_message = BindingSet::new().mutation(
            "login",
            MutationBinding::new(|_| std::panic::panic_any(42_u32)),
        );
        assert_eq!(
            dispatcher.handle_execute(&LOGIN, &Params::new(), &without_message, &key),
            ExecutionResult::failure(API_ERROR, UNKNOWN_ERROR_MESSAGE)
        );

        // both settled, so both invalidated
        assert_eq!(cache.invalidations(), vec![key.clone(), key]);
    }

    #[test]
    fn test_empty_error_message_falls_back() {
        let bindings = BindingSet::new().mutation("login", MutationBinding::new(|_| Err(err!(""))));
        let result = Dispatcher::new(seeded_cache()).handle_execute(
            &LOGIN,
            &Params::new(),
            &bindings,
            &QueryKey::empty(),
        );
        assert_eq!(result.message(), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn test_empty_key_skips_invalidation() {
        let cache = seeded_cache();
        let bindings = BindingSet::new().mutation(
            "login",
            MutationBinding::new(|_| Ok(ExecutionResult::success("ok", Value::Null))),
        );
        Dispatcher::new(cache.clone()).handle_execute(
            &LOGIN,
            &Params::new(),
            &bindings,
            &QueryKey::empty(),
        );
        assert!(cache.invalidations().is_empty());
    }

    #[test]
    fn test_query_never_invalidates() {
        let cache = seeded_cache();
        let bindings = BindingSet::new().query(
            "getAllStudents",
            QueryBinding::new(QueryKey::new(["students", "getAll"]), cache.clone(), |_| {
                Ok(json!([{"id": "students-0001"}]))
            }),
        );

        let result = Dispatcher::new(cache.clone()).handle_execute(
            &GET_ALL,
            &Params::new(),
            &bindings,
            &QueryKey::new(["students", "getAll"]),
        );

        assert!(result.is_success());
        assert_eq!(result.data(), Some(&json!([{"id": "students-0001"}])));
        assert!(cache.invalidations().is_empty());
        assert_eq!(
            cache.fresh(&QueryKey::new(["students", "getAll"])),
            Some(json!([{"id": "students-0001"}]))
        );
    }

    #[test]
    fn test_failed_query_maps_to_api_error() {
        let cache = seeded_cache();
        let bindings = BindingSet::new().query(
            "getAllStudents",
            QueryBinding::new(QueryKey::new(["students", "getAll"]), cache.clone(), |_| {
                Err(err!("store offline"))
            }),
        );
        let result = Dispatcher::new(cache).handle_execute(
            &GET_ALL,
            &Params::new(),
            &bindings,
            &QueryKey::empty(),
        );
        assert_eq!(result, ExecutionResult::failure(API_ERROR, "store offline"));
    }

    #[test]
    fn test_unbound_service_calls_nothing() {
        let cache = seeded_cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let bindings = BindingSet::new().mutation(
            "login",
            MutationBinding::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(ExecutionResult::success("ok", Value::Null))
            }),
        );

        let result = Dispatcher::new(cache.clone()).handle_execute(
            &MISSING,
            &Params::new(),
            &bindings,
            &QueryKey::new(["auth"]),
        );

        assert_eq!(result.error_code(), Some(INVALID_ENDPOINT));
        assert_eq!(result.message(), "Invalid endpoint");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(cache.invalidations().is_empty());
    }
}
