use chessdesk_base::pal::http::HttpMethod;

use crate::binding::BindingSet;
use crate::context::ConsoleContext;
use crate::domain::Collection;
use crate::endpoint::{EndpointDescriptor, ParameterSpec, SampleValue};
use crate::registry::{DomainModule, ModuleSpec, QueryKeyTable};

const ID: ParameterSpec = ParameterSpec::string("id", "Lesson id")
    .required()
    .sample(SampleValue::Text("lessons-0001"));

const CLASS_ID: ParameterSpec = ParameterSpec::string("classId", "Class taught")
    .required()
    .sample(SampleValue::Text("classes-0001"));

const ENDPOINTS: &[EndpointDescriptor] = &[
    EndpointDescriptor::new(HttpMethod::Get, "getAllLessons", "List every lesson", &[]),
    EndpointDescriptor::new(
        HttpMethod::Get,
        "getLessonsByClass",
        "List the lessons of one class",
        &[CLASS_ID],
    ),
    EndpointDescriptor::new(
        HttpMethod::Post,
        "createLesson",
        "Plan a lesson",
        &[
            CLASS_ID,
            ParameterSpec::string("title", "Topic")
                .required()
                .sample(SampleValue::Text("Rook endgames")),
            ParameterSpec::string("date", "Date, as YYYY-MM-DD").sample(SampleValue::Text("2024-09-07")),
            ParameterSpec::number("durationMinutes", "Length in minutes")
                .sample(SampleValue::Number(90.0)),
            ParameterSpec::string("content", "Lesson notes"),
        ],
    ),
    EndpointDescriptor::new(
        HttpMethod::Put,
        "updateLesson",
        "Change fields of a lesson",
        &[
            ID,
            ParameterSpec::object("data", "Fields to change")
                .required()
                .sample(SampleValue::Json(r#"{"title": "Lucena position"}"#)),
        ],
    ),
    EndpointDescriptor::new(HttpMethod::Delete, "deleteLesson", "Remove a lesson", &[ID]),
];

pub const QUERY_KEYS: QueryKeyTable = QueryKeyTable::new(
    "lessons",
    &[
        ("getAllLessons", &["lessons", "getAll"]),
        ("getLessonsByClass", &["lessons", "byClass"]),
        ("createLesson", &["lessons"]),
        ("updateLesson", &["lessons"]),
        ("deleteLesson", &["lessons"]),
    ],
);

const LESSONS: Collection = Collection {
    name: "lessons",
    label: "Lesson",
    query_keys: QUERY_KEYS,
    hidden: &[],
};

pub static MODULE: ModuleSpec = ModuleSpec {
    module: DomainModule::Lesson,
    endpoints: ENDPOINTS,
    query_keys: QUERY_KEYS,
    bindings,
};

fn bindings(context: &ConsoleContext) -> BindingSet {
    BindingSet::new()
        .query("getAllLessons", LESSONS.list(context, "getAllLessons"))
        .query(
            "getLessonsByClass",
            LESSONS.filter(context, "getLessonsByClass", &["classId"]),
        )
        .mutation("createLesson", LESSONS.create(context))
        .mutation("updateLesson", LESSONS.update(context))
        .mutation("deleteLesson", LESSONS.delete(context))
}
