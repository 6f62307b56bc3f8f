use chessdesk_base::pal::http::HttpMethod;

use crate::binding::BindingSet;
use crate::context::ConsoleContext;
use crate::domain::Collection;
use crate::endpoint::{EndpointDescriptor, ParameterSpec, SampleValue};
use crate::registry::{DomainModule, ModuleSpec, QueryKeyTable};

const ID: ParameterSpec = ParameterSpec::string("id", "Attendance mark id")
    .required()
    .sample(SampleValue::Text("attendance-0001"));

const CLASS_ID: ParameterSpec = ParameterSpec::string("classId", "Class id")
    .required()
    .sample(SampleValue::Text("classes-0001"));

const STUDENT_ID: ParameterSpec = ParameterSpec::string("studentId", "Student id")
    .required()
    .sample(SampleValue::Text("students-0001"));

const DATE: ParameterSpec =
    ParameterSpec::string("date", "Lesson date, as YYYY-MM-DD").sample(SampleValue::Text("2024-09-07"));

const ENDPOINTS: &[EndpointDescriptor] = &[
    EndpointDescriptor::new(
        HttpMethod::Get,
        "getAttendanceByClass",
        "Attendance of a class, optionally for one date",
        &[CLASS_ID, DATE],
    ),
    EndpointDescriptor::new(
        HttpMethod::Get,
        "getAttendanceByStudent",
        "Attendance history of one student",
        &[STUDENT_ID],
    ),
    EndpointDescriptor::new(
        HttpMethod::Post,
        "markAttendance",
        "Record whether a student attended a lesson",
        &[
            CLASS_ID,
            STUDENT_ID,
            DATE.required(),
            ParameterSpec::string("status", "present, absent or late")
                .required()
                .sample(SampleValue::Text("present")),
            ParameterSpec::string("note", "Free text"),
        ],
    ),
    EndpointDescriptor::new(
        HttpMethod::Put,
        "updateAttendance",
        "Change an attendance mark",
        &[
            ID,
            ParameterSpec::object("data", "Fields to change")
                .required()
                .sample(SampleValue::Json(r#"{"status": "late"}"#)),
        ],
    ),
    EndpointDescriptor::new(
        HttpMethod::Delete,
        "deleteAttendance",
        "Remove an attendance mark",
        &[ID],
    ),
];

pub const QUERY_KEYS: QueryKeyTable = QueryKeyTable::new(
    "attendance",
    &[
        ("getAttendanceByClass", &["attendance", "byClass"]),
        ("getAttendanceByStudent", &["attendance", "byStudent"]),
        ("markAttendance", &["attendance"]),
        ("updateAttendance", &["attendance"]),
        ("deleteAttendance", &["attendance"]),
    ],
);

const MARKS: Collection = Collection {
    name: "attendance",
    label: "Attendance record",
    query_keys: QUERY_KEYS,
    hidden: &[],
};

pub static MODULE: ModuleSpec = ModuleSpec {
    module: DomainModule::Attendance,
    endpoints: ENDPOINTS,
    query_keys: QUERY_KEYS,
    bindings,
};

fn bindings(context: &ConsoleContext) -> BindingSet {
    BindingSet::new()
        .query(
            "getAttendanceByClass",
            MARKS.filter(context, "getAttendanceByClass", &["classId", "date"]),
        )
        .query(
            "getAttendanceByStudent",
            MARKS.filter(context, "getAttendanceByStudent", &["studentId"]),
        )
        .mutation("markAttendance", MARKS.create(context))
        .mutation("updateAttendance", MARKS.update(context))
        .mutation("deleteAttendance", MARKS.delete(context))
}
