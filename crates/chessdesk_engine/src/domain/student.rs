use chessdesk_base::pal::http::HttpMethod;

use crate::binding::BindingSet;
use crate::context::ConsoleContext;
use crate::domain::Collection;
use crate::endpoint::{EndpointDescriptor, ParameterSpec, SampleValue};
use crate::registry::{DomainModule, ModuleSpec, QueryKeyTable};

const ID: ParameterSpec = ParameterSpec::string("id", "Student id")
    .required()
    .sample(SampleValue::Text("students-0001"));

const ENDPOINTS: &[EndpointDescriptor] = &[
    EndpointDescriptor::new(HttpMethod::Get, "getAllStudents", "List every student", &[]),
    EndpointDescriptor::new(HttpMethod::Get, "getStudentById", "Fetch one student", &[ID]),
    EndpointDescriptor::new(
        HttpMethod::Get,
        "searchStudents",
        "Find students whose name, email or phone contains the query",
        &[ParameterSpec::string("query", "Text to look for")
            .required()
            .sample(SampleValue::Text("nguyen"))],
    ),
    EndpointDescriptor::new(
        HttpMethod::Get,
        "getStudentsByClass",
        "List the students enrolled in a class",
        &[ParameterSpec::string("classId", "Class id")
            .required()
            .sample(SampleValue::Text("classes-0001"))],
    ),
    EndpointDescriptor::new(
        HttpMethod::Post,
        "createStudent",
        "Register a new student",
        &[
            ParameterSpec::string("name", "Full name")
                .required()
                .sample(SampleValue::Text("Linh Nguyen")),
            ParameterSpec::string("email", "Contact email")
                .sample(SampleValue::Text("linh.nguyen@example.com")),
            ParameterSpec::string("phone", "Contact phone").sample(SampleValue::Text("0901234567")),
            ParameterSpec::string("parentName", "Parent or guardian"),
            ParameterSpec::string("classId", "Class the student joins")
                .sample(SampleValue::Text("classes-0001")),
            ParameterSpec::number("rating", "Current rating").sample(SampleValue::Number(1200.0)),
            ParameterSpec::boolean("active", "Currently enrolled").sample(SampleValue::Flag(true)),
        ],
    ),
    EndpointDescriptor::new(
        HttpMethod::Put,
        "updateStudent",
        "Change fields of a student",
        &[
            ID,
            ParameterSpec::object("data", "Fields to change")
                .required()
                .sample(SampleValue::Json(r#"{"rating": 1350}"#)),
        ],
    ),
    EndpointDescriptor::new(HttpMethod::Delete, "deleteStudent", "Remove a student", &[ID]),
];

pub const QUERY_KEYS: QueryKeyTable = QueryKeyTable::new(
    "students",
    &[
        ("getAllStudents", &["students", "getAll"]),
        ("getStudentById", &["students", "detail"]),
        ("searchStudents", &["students", "search"]),
        ("getStudentsByClass", &["students", "byClass"]),
        ("createStudent", &["students"]),
        ("updateStudent", &["students"]),
        ("deleteStudent", &["students"]),
    ],
);

const STUDENTS: Collection = Collection {
    name: "students",
    label: "Student",
    query_keys: QUERY_KEYS,
    hidden: &[],
};

pub static MODULE: ModuleSpec = ModuleSpec {
    module: DomainModule::Student,
    endpoints: ENDPOINTS,
    query_keys: QUERY_KEYS,
    bindings,
};

fn bindings(context: &ConsoleContext) -> BindingSet {
    BindingSet::new()
        .query("getAllStudents", STUDENTS.list(context, "getAllStudents"))
        .query("getStudentById", STUDENTS.by_id(context, "getStudentById"))
        .query(
            "searchStudents",
            STUDENTS.search(context, "searchStudents", &["name", "email", "phone"]),
        )
        .query(
            "getStudentsByClass",
            STUDENTS.filter(context, "getStudentsByClass", &["classId"]),
        )
        .mutation("createStudent", STUDENTS.create(context))
        .mutation("updateStudent", STUDENTS.update(context))
        .mutation("deleteStudent", STUDENTS.delete(context))
}
