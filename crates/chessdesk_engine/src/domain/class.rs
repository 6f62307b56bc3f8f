use chessdesk_base::pal::http::HttpMethod;

use crate::binding::BindingSet;
use crate::context::ConsoleContext;
use crate::domain::Collection;
use crate::endpoint::{EndpointDescriptor, ParameterSpec, SampleValue};
use crate::registry::{DomainModule, ModuleSpec, QueryKeyTable};

const ID: ParameterSpec = ParameterSpec::string("id", "Class id")
    .required()
    .sample(SampleValue::Text("classes-0001"));

const ENDPOINTS: &[EndpointDescriptor] = &[
    EndpointDescriptor::new(HttpMethod::Get, "getAllClasses", "List every class", &[]),
    EndpointDescriptor::new(HttpMethod::Get, "getClassById", "Fetch one class", &[ID]),
    EndpointDescriptor::new(
        HttpMethod::Post,
        "createClass",
        "Open a new class",
        &[
            ParameterSpec::string("name", "Class name")
                .required()
                .sample(SampleValue::Text("Beginners A")),
            ParameterSpec::string("level", "Playing level").sample(SampleValue::Text("beginner")),
            ParameterSpec::string("coach", "Coach in charge").sample(SampleValue::Text("Tran Minh")),
            ParameterSpec::number("maxStudents", "Seats available").sample(SampleValue::Number(12.0)),
            ParameterSpec::object("schedule", "Weekly time slot")
                .sample(SampleValue::Json(r#"{"day": "Saturday", "time": "09:00"}"#)),
        ],
    ),
    EndpointDescriptor::new(
        HttpMethod::Put,
        "updateClass",
        "Change fields of a class",
        &[
            ID,
            ParameterSpec::object("data", "Fields to change")
                .required()
                .sample(SampleValue::Json(r#"{"maxStudents": 16}"#)),
        ],
    ),
    EndpointDescriptor::new(HttpMethod::Delete, "deleteClass", "Close a class", &[ID]),
];

pub const QUERY_KEYS: QueryKeyTable = QueryKeyTable::new(
    "classes",
    &[
        ("getAllClasses", &["classes", "getAll"]),
        ("getClassById", &["classes", "detail"]),
        ("createClass", &["classes"]),
        ("updateClass", &["classes"]),
        ("deleteClass", &["classes"]),
    ],
);

const CLASSES: Collection = Collection {
    name: "classes",
    label: "Class",
    query_keys: QUERY_KEYS,
    hidden: &[],
};

pub static MODULE: ModuleSpec = ModuleSpec {
    module: DomainModule::Class,
    endpoints: ENDPOINTS,
    query_keys: QUERY_KEYS,
    bindings,
};

fn bindings(context: &ConsoleContext) -> BindingSet {
    BindingSet::new()
        .query("getAllClasses", CLASSES.list(context, "getAllClasses"))
        .query("getClassById", CLASSES.by_id(context, "getClassById"))
        .mutation("createClass", CLASSES.create(context))
        .mutation("updateClass", CLASSES.update(context))
        .mutation("deleteClass", CLASSES.delete(context))
}
