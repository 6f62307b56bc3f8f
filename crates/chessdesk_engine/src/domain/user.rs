use chessdesk_base::pal::http::HttpMethod;

use crate::binding::BindingSet;
use crate::context::ConsoleContext;
use crate::domain::Collection;
use crate::domain::auth::USERS as USER_COLLECTION;
use crate::endpoint::{EndpointDescriptor, ParameterSpec, SampleValue};
use crate::registry::{DomainModule, ModuleSpec, QueryKeyTable};

const ID: ParameterSpec = ParameterSpec::string("id", "User id")
    .required()
    .sample(SampleValue::Text("users-0001"));

const ENDPOINTS: &[EndpointDescriptor] = &[
    EndpointDescriptor::new(HttpMethod::Get, "getAllUsers", "List every staff account", &[]),
    EndpointDescriptor::new(HttpMethod::Get, "getUserById", "Fetch one staff account", &[ID]),
    EndpointDescriptor::new(
        HttpMethod::Post,
        "createUser",
        "Create a staff account",
        &[
            ParameterSpec::string("username", "Login name")
                .required()
                .sample(SampleValue::Text("coach.minh")),
            ParameterSpec::string("password", "Initial password")
                .required()
                .sample(SampleValue::Text("Coach123@")),
            ParameterSpec::string("role", "admin or staff").sample(SampleValue::Text("staff")),
            ParameterSpec::string("displayName", "Name shown in the console")
                .sample(SampleValue::Text("Tran Minh")),
        ],
    ),
    EndpointDescriptor::new(
        HttpMethod::Put,
        "updateUser",
        "Change fields of a staff account",
        &[
            ID,
            ParameterSpec::object("data", "Fields to change")
                .required()
                .sample(SampleValue::Json(r#"{"role": "admin"}"#)),
        ],
    ),
    EndpointDescriptor::new(HttpMethod::Delete, "deleteUser", "Remove a staff account", &[ID]),
];

pub const QUERY_KEYS: QueryKeyTable = QueryKeyTable::new(
    "users",
    &[
        ("getAllUsers", &["users", "getAll"]),
        ("getUserById", &["users", "detail"]),
        ("createUser", &["users"]),
        ("updateUser", &["users"]),
        ("deleteUser", &["users"]),
    ],
);

const ACCOUNTS: Collection = Collection {
    name: USER_COLLECTION,
    label: "User",
    query_keys: QUERY_KEYS,
    hidden: &["password"],
};

pub static MODULE: ModuleSpec = ModuleSpec {
    module: DomainModule::User,
    endpoints: ENDPOINTS,
    query_keys: QUERY_KEYS,
    bindings,
};

fn bindings(context: &ConsoleContext) -> BindingSet {
    BindingSet::new()
        .query("getAllUsers", ACCOUNTS.list(context, "getAllUsers"))
        .query("getUserById", ACCOUNTS.by_id(context, "getUserById"))
        .mutation("createUser", ACCOUNTS.create(context))
        .mutation("updateUser", ACCOUNTS.update(context))
        .mutation("deleteUser", ACCOUNTS.delete(context))
}
