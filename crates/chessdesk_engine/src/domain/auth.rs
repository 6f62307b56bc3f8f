use chessdesk_base::pal::http::HttpMethod;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::binding::{BindingSet, MutationBinding, QueryBinding};
use crate::context::ConsoleContext;
use crate::domain::{optional_str, require_str};
use crate::endpoint::{EndpointDescriptor, ParameterSpec, SampleValue};
use crate::registry::{DomainModule, ModuleSpec, QueryKeyTable};
use crate::result::ExecutionResult;
use crate::session::SessionUser;
use crate::store::{Record, record_id};

/// Collection the staff accounts live in.
pub const USERS: &str = "users";

pub const LOGOUT_ERROR: &str = "LOGOUT_ERROR";
pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
pub const NOT_AUTHENTICATED: &str = "NOT_AUTHENTICATED";
pub const INVALID_PASSWORD: &str = "INVALID_PASSWORD";

pub const ENDPOINTS: &[EndpointDescriptor] = &[
    EndpointDescriptor::new(
        HttpMethod::Post,
        "login",
        "Log in with a staff account and start a session",
        &[
            ParameterSpec::string("username", "Login name")
                .required()
                .sample(SampleValue::Text("admin")),
            ParameterSpec::string("password", "Password")
                .required()
                .sample(SampleValue::Text("Pass123@")),
        ],
    ),
    EndpointDescriptor::new(HttpMethod::Post, "logout", "End the current session", &[]),
    EndpointDescriptor::new(
        HttpMethod::Get,
        "getCurrentUser",
        "The user of the current session, or null",
        &[],
    ),
    EndpointDescriptor::new(
        HttpMethod::Post,
        "changePassword",
        "Change the password of the logged-in user",
        &[
            ParameterSpec::string("currentPassword", "Password in use")
                .required()
                .sample(SampleValue::Text("Pass123@")),
            ParameterSpec::string("newPassword", "Replacement password")
                .required()
                .sample(SampleValue::Text("NewPass456@")),
        ],
    ),
];

pub const QUERY_KEYS: QueryKeyTable = QueryKeyTable::new(
    "auth",
    &[
        ("login", &["auth"]),
        ("logout", &["auth"]),
        ("getCurrentUser", &["auth", "currentUser"]),
        ("changePassword", &["auth"]),
    ],
);

pub static MODULE: ModuleSpec = ModuleSpec {
    module: DomainModule::Auth,
    endpoints: ENDPOINTS,
    query_keys: QUERY_KEYS,
    bindings,
};

fn bindings(context: &ConsoleContext) -> BindingSet {
    BindingSet::new()
        .mutation("login", login(context))
        .mutation("logout", logout(context))
        .query("getCurrentUser", current_user(context))
        .mutation("changePassword", change_password(context))
}

fn login(context: &ConsoleContext) -> MutationBinding {
    let records = context.records.clone();
    let session = context.session.clone();
    MutationBinding::new(move |params| {
        let username = require_str(params, "username")?;
        let password = optional_str(params, "password").unwrap_or_default();
        let account = records
            .find(USERS, |record| {
                field(record, "username") == Some(username.as_str())
                    && field(record, "password") == Some(password.as_str())
            })?
            .into_iter()
            .next();
        let Some(account) = account else {
            warn!(%username, "rejected login");
            return Ok(ExecutionResult::failure(
                INVALID_CREDENTIALS,
                "Invalid username or password",
            ));
        };
        let user = session_user(&account);
        session.login(user.clone());
        Ok(ExecutionResult::success("Login successful", json!(user)))
    })
}

fn logout(context: &ConsoleContext) -> MutationBinding {
    let session = context.session.clone();
    MutationBinding::new(move |_| {
        Ok(match session.logout() {
            Some(_) => ExecutionResult::success("Logout successful", Value::Null),
            None => ExecutionResult::failure(LOGOUT_ERROR, "Failed to logout"),
        })
    })
}

fn current_user(context: &ConsoleContext) -> QueryBinding {
    let session = context.session.clone();
    QueryBinding::new(
        QUERY_KEYS.lookup("getCurrentUser"),
        context.cache.clone(),
        move |_| Ok(json!(session.current())),
    )
}

fn change_password(context: &ConsoleContext) -> MutationBinding {
    let records = context.records.clone();
    let session = context.session.clone();
    MutationBinding::new(move |params| {
        let current = require_str(params, "currentPassword")?;
        let replacement = require_str(params, "newPassword")?;
        let Some(user) = session.current() else {
            return Ok(ExecutionResult::failure(NOT_AUTHENTICATED, "Not logged in"));
        };
        let stored = records.get(USERS, &user.id)?;
        if stored
            .as_ref()
            .and_then(|record| field(record, "password"))
            != Some(current.as_str())
        {
            return Ok(ExecutionResult::failure(
                INVALID_PASSWORD,
                "Current password is incorrect",
            ));
        }
        let mut patch = Record::new();
        patch.insert("password".to_string(), Value::from(replacement));
        records.update(USERS, &user.id, patch)?;
        info!(username = %user.username, "password changed");
        Ok(ExecutionResult::success("Password changed successfully", Value::Null))
    })
}

fn field<'a>(record: &'a Record, name: &str) -> Option<&'a str> {
    record.get(name).and_then(Value::as_str)
}

fn session_user(account: &Record) -> SessionUser {
    SessionUser {
        id: record_id(account).unwrap_or_default().to_string(),
        username: field(account, "username").unwrap_or_default().to_string(),
        role: field(account, "role").unwrap_or("staff").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{MutationHandle, Params, Resolved};

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    fn context_with_admin() -> ConsoleContext {
        let context = ConsoleContext::in_memory();
        context
            .records
            .insert(
                USERS,
                params(json!({"username": "admin", "password": "Pass123@", "role": "admin"})),
            )
            .unwrap();
        context
    }

    fn mutation(bindings: &BindingSet, service: &str) -> std::sync::Arc<dyn MutationHandle> {
        match bindings.resolve(service) {
            Resolved::Mutation(handle) => handle,
            other => panic!("expected a mutation, got {:?}", other),
        }
    }

    #[test]
    fn test_login_starts_session() {
        let context = context_with_admin();
        let bindings = MODULE.bind(&context);

        let result = mutation(&bindings, "login")
            .execute(&params(json!({"username": "admin", "password": "Pass123@"})))
            .unwrap();

        assert_eq!(
            result,
            ExecutionResult::success(
                "Login successful",
                json!({"id": "users-0001", "username": "admin", "role": "admin"})
            )
        );
        assert!(context.session.is_authenticated());
    }

    #[test]
    fn test_login_rejects_wrong_password() {
        let context = context_with_admin();
        let result = mutation(&MODULE.bind(&context), "login")
            .execute(&params(json!({"username": "admin", "password": "nope"})))
            .unwrap();
        assert_eq!(result.error_code(), Some(INVALID_CREDENTIALS));
        assert!(!context.session.is_authenticated());
    }

    #[test]
    fn test_logout_without_session_fails() {
        let context = context_with_admin();
        let result = mutation(&MODULE.bind(&context), "logout")
            .execute(&Params::new())
            .unwrap();
        assert_eq!(result, ExecutionResult::failure(LOGOUT_ERROR, "Failed to logout"));
    }

    #[test]
    fn test_current_user_and_password_change() {
        let context = context_with_admin();
        let bindings = MODULE.bind(&context);
        let Resolved::Query(current) = bindings.resolve("getCurrentUser") else {
            panic!("expected a query");
        };
        assert_eq!(current.trigger(&Params::new()).unwrap(), Value::Null);

        let change = mutation(&bindings, "changePassword");
        let change_params = params(json!({"currentPassword": "Pass123@", "newPassword": "Nf3!"}));
        assert_eq!(
            change.execute(&change_params).unwrap().error_code(),
            Some(NOT_AUTHENTICATED)
        );

        mutation(&bindings, "login")
            .execute(&params(json!({"username": "admin", "password": "Pass123@"})))
            .unwrap();
        assert_eq!(current.trigger(&Params::new()).unwrap()["username"], "admin");

        assert!(change.execute(&change_params).unwrap().is_success());
        assert_eq!(
            change.execute(&change_params).unwrap().error_code(),
            Some(INVALID_PASSWORD)
        );
        assert_eq!(
            context.records.get(USERS, "users-0001").unwrap().unwrap()["password"],
            "Nf3!"
        );
    }
}
