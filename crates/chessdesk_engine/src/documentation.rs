/* 📖 # What is a documentation page?

A `DocumentationPage` is the interactive reference of one domain module: one
collapsible `EndpointForm` per endpoint, in table order, and an `on_execute`
callback that runs a coerced submission. Mounting a page for a module builds
that module's bindings and wires `on_execute` to the dispatcher with the
module's query-key table, so every module page behaves the same and only the
tables differ.

`render()` produces the plain-text view served at `/docs/{module}`: a marker
per form (`[+]` collapsed, `[-]` expanded), the inputs of expanded forms and
the outcome of the last submission.
*/

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::binding::Params;
use crate::context::ConsoleContext;
use crate::dispatcher::Dispatcher;
use crate::endpoint::EndpointDescriptor;
use crate::form::{EndpointForm, FieldInput, FormError, FormOutcome};
use crate::registry::ModuleSpec;
use crate::result::ExecutionResult;

type OnExecute = dyn Fn(&EndpointDescriptor, &Params) -> ExecutionResult + Send + Sync;

/// Forms for every endpoint of a module plus the callback that executes them.
pub struct DocumentationPage {
    title: String,
    forms: Vec<EndpointForm>,
    on_execute: Arc<OnExecute>,
}

impl DocumentationPage {
    pub fn new<F>(title: impl Into<String>, endpoints: &[EndpointDescriptor], on_execute: F) -> Self
    where
        F: Fn(&EndpointDescriptor, &Params) -> ExecutionResult + Send + Sync + 'static,
    {
        Self {
            title: title.into(),
            forms: endpoints.iter().copied().map(EndpointForm::new).collect(),
            on_execute: Arc::new(on_execute),
        }
    }

    /// Mount the page of `spec`, executing through a dispatcher on the context's cache.
    pub fn mount(spec: &ModuleSpec, context: &ConsoleContext) -> Self {
        let bindings = spec.bind(context);
        let dispatcher = Dispatcher::new(context.cache.clone());
        let query_keys = spec.query_keys;
        debug!(module = %spec.module, services = bindings.len(), "mounting documentation page");
        Self::new(spec.title(), spec.endpoints, move |endpoint, params| {
            dispatcher.handle_execute(
                endpoint,
                params,
                &bindings,
                &query_keys.lookup(endpoint.service),
            )
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn forms(&self) -> &[EndpointForm] {
        &self.forms
    }

    pub fn form(&self, service: &str) -> Option<&EndpointForm> {
        self.forms
            .iter()
            .find(|form| form.endpoint().service == service)
    }

    /// Submit the form of `service` with `overrides` applied to its inputs.
    ///
    /// The form is expanded so its outcome shows up in the rendering. A service
    /// without a form yields an `INVALID_ENDPOINT` result.
    #[instrument(skip(self, overrides), fields(page = %self.title))]
    pub fn submit(
        &self,
        service: &str,
        overrides: &BTreeMap<String, String>,
    ) -> Result<FormOutcome, FormError> {
        let Some(form) = self.form(service) else {
            return Ok(FormOutcome::Result(ExecutionResult::invalid_endpoint()));
        };
        form.set_expanded(true);
        let on_execute = self.on_execute.clone();
        form.submit(overrides, |endpoint, params| on_execute(endpoint, params))
    }

    /// Plain-text rendering of the page.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "{}", "=".repeat(self.title.chars().count()));
        for form in &self.forms {
            out.push('\n');
            render_form(&mut out, form);
        }
        out
    }
}

fn render_form(out: &mut String, form: &EndpointForm) {
    let endpoint = form.endpoint();
    let marker = if form.is_expanded() { "[-]" } else { "[+]" };
    let _ = writeln!(
        out,
        "{} {} {} - {}",
        marker, endpoint.method, endpoint.service, endpoint.description
    );
    if !form.is_expanded() {
        return;
    }
    if endpoint.parameters.is_empty() {
        let _ = writeln!(out, "    (no parameters)");
    }
    for (spec, input) in form.inputs() {
        let required = if spec.required { ", required" } else { "" };
        let shown = match input {
            FieldInput::Toggle(true) => "[x]".to_string(),
            FieldInput::Toggle(false) => "[ ]".to_string(),
            FieldInput::Text(text) => format!("{:?}", text),
        };
        let _ = writeln!(
            out,
            "    {} ({}{}): {} = {}",
            spec.name,
            spec.param_type.as_str(),
            required,
            spec.description,
            shown
        );
    }
    if form.is_submitting() {
        let _ = writeln!(out, "    Running...");
    }
    match form.last_outcome() {
        Some(FormOutcome::Result(ExecutionResult::Success { message, data })) => {
            let _ = writeln!(out, "    Success: {}", message);
            let pretty = serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string());
            for line in pretty.lines() {
                let _ = writeln!(out, "    {}", line);
            }
        }
        Some(FormOutcome::Result(ExecutionResult::Failure {
            error_code,
            message,
        })) => {
            let _ = writeln!(out, "    Error {}: {}", error_code, message);
        }
        Some(FormOutcome::FieldErrors(errors)) => {
            for error in errors {
                let _ = writeln!(out, "    ! {}: {}", error.field, error.message);
            }
        }
        None => {}
    }
}

impl std::fmt::Debug for DocumentationPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentationPage")
            .field("title", &self.title)
            .field("forms", &self.forms.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{BindingSet, MutationBinding};
    use crate::cache::{CacheHandle, QueryClient};
    use crate::domain::auth;
    use crate::query_key::QueryKey;
    use crate::result::INVALID_ENDPOINT;
    use expect_test::expect;
    use parking_lot::Mutex;
    use serde_json::{Value, json};

    static STUB_AUTH: ModuleSpec = ModuleSpec {
        module: crate::registry::DomainModule::Auth,
        endpoints: auth::ENDPOINTS,
        query_keys: auth::QUERY_KEYS,
        bindings: stub_bindings,
    };

    /// `login` echoes its parameters, `logout` always fails.
    fn stub_bindings(_: &ConsoleContext) -> BindingSet {
        BindingSet::new()
            .mutation(
                "login",
                MutationBinding::new(|params| {
                    Ok(ExecutionResult::success(
                        "Login successful",
                        Value::Object(params.clone()),
                    ))
                }),
            )
            .mutation(
                "logout",
                MutationBinding::new(|_| {
                    Ok(ExecutionResult::failure("LOGOUT_ERROR", "Failed to logout"))
                }),
            )
    }

    #[test]
    fn test_login_scenario() {
        let context = ConsoleContext::in_memory();
        context
            .cache
            .set(QueryKey::new(["auth", "currentUser"]), Value::Null);
        context.cache.set(QueryKey::new(["students", "getAll"]), json!([]));
        let page = DocumentationPage::mount(&STUB_AUTH, &context);

        let outcome = page.submit("login", &BTreeMap::new()).unwrap();
        assert_eq!(
            outcome,
            FormOutcome::Result(ExecutionResult::success(
                "Login successful",
                json!({"username": "admin", "password": "Pass123@"})
            ))
        );
        assert_eq!(context.cache.invalidations(), vec![QueryKey::new(["auth"])]);
        assert!(context.cache.fresh(&QueryKey::new(["auth", "currentUser"])).is_none());
        assert!(context.cache.fresh(&QueryKey::new(["students", "getAll"])).is_some());
    }

    #[test]
    fn test_logout_scenario_renders_error_and_stays_usable() {
        let context = ConsoleContext::in_memory();
        let page = DocumentationPage::mount(&STUB_AUTH, &context);

        page.submit("logout", &BTreeMap::new()).unwrap();
        let form = page.form("logout").unwrap();
        assert!(!form.is_submitting());
        assert!(page.render().contains("    Error LOGOUT_ERROR: Failed to logout\n"));

        // a second submission goes through again
        page.submit("logout", &BTreeMap::new()).unwrap();
        assert_eq!(context.cache.invalidations().len(), 2);
    }

    #[test]
    fn test_unbound_and_unknown_services() {
        let page = DocumentationPage::mount(&STUB_AUTH, &ConsoleContext::in_memory());

        // declared but not bound by the stub
        let outcome = page.submit("getCurrentUser", &BTreeMap::new()).unwrap();
        let FormOutcome::Result(result) = outcome else {
            panic!("expected a result");
        };
        assert_eq!(result.error_code(), Some(INVALID_ENDPOINT));

        // not declared at all
        let outcome = page.submit("resetEverything", &BTreeMap::new()).unwrap();
        assert_eq!(
            outcome,
            FormOutcome::Result(ExecutionResult::invalid_endpoint())
        );
    }

    #[test]
    fn test_override_reaches_dispatcher() {
        let seen = std::sync::Arc::new(Mutex::new(None));
        let recorder = seen.clone();
        let page = DocumentationPage::new("Auth", auth::ENDPOINTS, move |_, params| {
            *recorder.lock() = Some(params.clone());
            ExecutionResult::success("ok", Value::Null)
        });

        let overrides = BTreeMap::from([("username".to_string(), "coach".to_string())]);
        page.submit("login", &overrides).unwrap();
        assert_eq!(
            seen.lock().clone().map(Value::Object),
            Some(json!({"username": "coach", "password": "Pass123@"}))
        );
    }

    #[test]
    fn test_render() {
        let cache = CacheHandle::new(QueryClient::new());
        let bindings = stub_bindings(&ConsoleContext::in_memory());
        let dispatcher = Dispatcher::new(cache);
        let page = DocumentationPage::new("Authentication", auth::ENDPOINTS, move |e, p| {
            dispatcher.handle_execute(e, p, &bindings, &QueryKey::empty())
        });
        page.submit("login", &BTreeMap::new()).unwrap();
        page.submit("changePassword", &BTreeMap::from([(
            "newPassword".to_string(),
            String::new(),
        )]))
        .unwrap();

        expect![[r#"
            Authentication
            ==============

            [-] POST login - Log in with a staff account and start a session
                username (string, required): Login name = "admin"
                password (string, required): Password = "Pass123@"
                Success: Login successful
                {
                  "password": "Pass123@",
                  "username": "admin"
                }

            [+] POST logout - End the current session

            [+] GET getCurrentUser - The user of the current session, or null

            [-] POST changePassword - Change the password of the logged-in user
                currentPassword (string, required): Password in use = "Pass123@"
                newPassword (string, required): Replacement password = ""
                ! newPassword: This field is required
        "#]]
        .assert_eq(&page.render());
    }
}
