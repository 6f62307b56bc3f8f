use chessdesk_base::pal::http::HttpMethod;

use crate::binding::BindingSet;
use crate::context::ConsoleContext;
use crate::domain::Collection;
use crate::endpoint::{EndpointDescriptor, ParameterSpec, SampleValue};
use crate::registry::{DomainModule, ModuleSpec, QueryKeyTable};

const ID: ParameterSpec = ParameterSpec::string("id", "Payment id")
    .required()
    .sample(SampleValue::Text("tuition-0001"));

const STUDENT_ID: ParameterSpec = ParameterSpec::string("studentId", "Paying student")
    .required()
    .sample(SampleValue::Text("students-0001"));

const ENDPOINTS: &[EndpointDescriptor] = &[
    EndpointDescriptor::new(HttpMethod::Get, "getAllTuition", "List every tuition payment", &[]),
    EndpointDescriptor::new(
        HttpMethod::Get,
        "getTuitionByStudent",
        "List the payments of one student",
        &[STUDENT_ID],
    ),
    EndpointDescriptor::new(
        HttpMethod::Post,
        "createTuitionPayment",
        "Record a tuition payment",
        &[
            STUDENT_ID,
            ParameterSpec::number("amount", "Amount paid")
                .required()
                .sample(SampleValue::Number(500000.0)),
            ParameterSpec::string("month", "Month covered, as YYYY-MM")
                .required()
                .sample(SampleValue::Text("2024-09")),
            ParameterSpec::string("method", "cash or transfer").sample(SampleValue::Text("cash")),
            ParameterSpec::boolean("paid", "Payment received").sample(SampleValue::Flag(true)),
            ParameterSpec::string("note", "Free text"),
        ],
    ),
    EndpointDescriptor::new(
        HttpMethod::Put,
        "updateTuition",
        "Change fields of a payment",
        &[
            ID,
            ParameterSpec::object("data", "Fields to change")
                .required()
                .sample(SampleValue::Json(r#"{"paid": false}"#)),
        ],
    ),
    EndpointDescriptor::new(HttpMethod::Delete, "deleteTuition", "Remove a payment", &[ID]),
];

pub const QUERY_KEYS: QueryKeyTable = QueryKeyTable::new(
    "tuition",
    &[
        ("getAllTuition", &["tuition", "getAll"]),
        ("getTuitionByStudent", &["tuition", "byStudent"]),
        ("createTuitionPayment", &["tuition"]),
        ("updateTuition", &["tuition"]),
        ("deleteTuition", &["tuition"]),
    ],
);

const PAYMENTS: Collection = Collection {
    name: "tuition",
    label: "Tuition payment",
    query_keys: QUERY_KEYS,
    hidden: &[],
};

pub static MODULE: ModuleSpec = ModuleSpec {
    module: DomainModule::Tuition,
    endpoints: ENDPOINTS,
    query_keys: QUERY_KEYS,
    bindings,
};

fn bindings(context: &ConsoleContext) -> BindingSet {
    BindingSet::new()
        .query("getAllTuition", PAYMENTS.list(context, "getAllTuition"))
        .query(
            "getTuitionByStudent",
            PAYMENTS.filter(context, "getTuitionByStudent", &["studentId"]),
        )
        .mutation("createTuitionPayment", PAYMENTS.create(context))
        .mutation("updateTuition", PAYMENTS.update(context))
        .mutation("deleteTuition", PAYMENTS.delete(context))
}
