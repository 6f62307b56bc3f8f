/* 📖 # How do the per-module tables become one registry?

Each domain module declares three things as `static` data: its endpoint
table, its query-key table and a function that builds its bindings from a
`ConsoleContext`. Together they form a `ModuleSpec`. `Registry::new()` collects
the module specs into one value at start-up; nothing is registered later and
nothing is built lazily.

The query-key table maps service names to keys. Reads map to
`[root, operation]`, writes map to the bare `[root]` so that invalidating it
reaches every read of the module. A service missing from the table yields the
empty key, which the dispatcher takes as "nothing to invalidate".
*/

use std::collections::BTreeSet;

use serde::Serialize;

use crate::binding::BindingSet;
use crate::context::ConsoleContext;
use crate::endpoint::EndpointDescriptor;
use crate::query_key::QueryKey;

/// The functional areas of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainModule {
    Auth,
    Class,
    Student,
    Tuition,
    Lesson,
    User,
    Attendance,
}

impl DomainModule {
    pub const ALL: [DomainModule; 7] = [
        Self::Auth,
        Self::Class,
        Self::Student,
        Self::Tuition,
        Self::Lesson,
        Self::User,
        Self::Attendance,
    ];

    /// Stable identifier used in URLs.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Class => "class",
            Self::Student => "student",
            Self::Tuition => "tuition",
            Self::Lesson => "lesson",
            Self::User => "user",
            Self::Attendance => "attendance",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Auth => "Authentication",
            Self::Class => "Classes",
            Self::Student => "Students",
            Self::Tuition => "Tuition",
            Self::Lesson => "Lessons",
            Self::User => "Users",
            Self::Attendance => "Attendance",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|module| module.id() == id)
    }

    /// Everything except authentication needs a logged-in user.
    pub fn requires_session(&self) -> bool {
        *self != Self::Auth
    }
}

impl std::fmt::Display for DomainModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Service name to query key mapping of one module.
#[derive(Debug, Clone, Copy)]
pub struct QueryKeyTable {
    pub root: &'static str,
    pub entries: &'static [(&'static str, &'static [&'static str])],
}

impl QueryKeyTable {
    pub const fn new(
        root: &'static str,
        entries: &'static [(&'static str, &'static [&'static str])],
    ) -> Self {
        Self { root, entries }
    }

    /// The key for `service`, or the empty key if the table has none.
    pub fn lookup(&self, service: &str) -> QueryKey {
        self.entries
            .iter()
            .find(|(name, _)| *name == service)
            .map(|(_, segments)| QueryKey::from(*segments))
            .unwrap_or_default()
    }

    pub fn contains(&self, service: &str) -> bool {
        self.entries.iter().any(|(name, _)| *name == service)
    }

    /// The module-wide key every entry starts with.
    pub fn root_key(&self) -> QueryKey {
        QueryKey::new([self.root])
    }
}

/// Everything the console knows about one domain module.
pub struct ModuleSpec {
    pub module: DomainModule,
    pub endpoints: &'static [EndpointDescriptor],
    pub query_keys: QueryKeyTable,
    pub bindings: fn(&ConsoleContext) -> BindingSet,
}

impl ModuleSpec {
    pub fn title(&self) -> &'static str {
        self.module.title()
    }

    pub fn endpoint(&self, service: &str) -> Option<&'static EndpointDescriptor> {
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.service == service)
    }

    /// A fresh binding set for this module.
    pub fn bind(&self, context: &ConsoleContext) -> BindingSet {
        (self.bindings)(context)
    }
}

impl std::fmt::Debug for ModuleSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleSpec")
            .field("module", &self.module)
            .field("endpoints", &self.endpoints.len())
            .field("root", &self.query_keys.root)
            .finish()
    }
}

/// An inconsistency between a module's tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryIssue {
    MissingQueryKey {
        module: DomainModule,
        service: &'static str,
    },
    DuplicateService {
        module: DomainModule,
        service: &'static str,
    },
}

impl std::fmt::Display for RegistryIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingQueryKey { module, service } => {
                write!(f, "{}: no query key for service '{}'", module, service)
            }
            Self::DuplicateService { module, service } => {
                write!(f, "{}: service '{}' is declared twice", module, service)
            }
        }
    }
}

/// All domain modules of the console.
#[derive(Debug, Clone)]
pub struct Registry {
    modules: Vec<&'static ModuleSpec>,
}

impl Registry {
    pub fn new() -> Self {
        Self::from_modules(&crate::domain::MODULES)
    }

    pub fn from_modules(modules: &[&'static ModuleSpec]) -> Self {
        Self {
            modules: modules.to_vec(),
        }
    }

    pub fn get(&self, module: DomainModule) -> Option<&'static ModuleSpec> {
        self.modules.iter().copied().find(|spec| spec.module == module)
    }

    /// Look a module up by its URL id.
    pub fn find_module(&self, id: &str) -> Option<&'static ModuleSpec> {
        DomainModule::parse(id).and_then(|module| self.get(module))
    }

    pub fn modules(&self) -> impl Iterator<Item = &'static ModuleSpec> + '_ {
        self.modules.iter().copied()
    }

    /// Cross-check every module's endpoint table against its query-key table.
    pub fn validate(&self) -> Vec<RegistryIssue> {
        let mut issues = vec![];
        for spec in &self.modules {
            let mut seen = BTreeSet::new();
            for endpoint in spec.endpoints {
                if !seen.insert(endpoint.service) {
                    issues.push(RegistryIssue::DuplicateService {
                        module: spec.module,
                        service: endpoint.service,
                    });
                }
                if !spec.query_keys.contains(endpoint.service) {
                    issues.push(RegistryIssue::MissingQueryKey {
                        module: spec.module,
                        service: endpoint.service,
                    });
                }
            }
        }
        issues
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chessdesk_base::pal::http::HttpMethod;

    const KEYS: QueryKeyTable = QueryKeyTable::new(
        "widgets",
        &[
            ("getAllWidgets", &["widgets", "getAll"]),
            ("createWidget", &["widgets"]),
        ],
    );

    static BROKEN: ModuleSpec = ModuleSpec {
        module: DomainModule::Lesson,
        endpoints: &[
            EndpointDescriptor::new(HttpMethod::Get, "getAllWidgets", "List", &[]),
            EndpointDescriptor::new(HttpMethod::Get, "getAllWidgets", "List again", &[]),
            EndpointDescriptor::new(HttpMethod::Delete, "deleteWidget", "Delete", &[]),
        ],
        query_keys: KEYS,
        bindings: |_| BindingSet::new(),
    };

    #[test]
    fn test_lookup() {
        assert_eq!(KEYS.lookup("getAllWidgets"), QueryKey::new(["widgets", "getAll"]));
        assert_eq!(KEYS.lookup("createWidget"), KEYS.root_key());
        assert!(KEYS.lookup("unknown").is_empty());
    }

    #[test]
    fn test_module_ids_round_trip() {
        for module in DomainModule::ALL {
            assert_eq!(DomainModule::parse(module.id()), Some(module));
        }
        assert_eq!(DomainModule::parse("students"), None);
        assert!(!DomainModule::Auth.requires_session());
        assert!(DomainModule::Tuition.requires_session());
    }

    #[test]
    fn test_validate_reports_issues() {
        let registry = Registry::from_modules(&[&BROKEN]);
        let issues: Vec<String> = registry.validate().iter().map(ToString::to_string).collect();
        assert_eq!(
            issues,
            vec![
                "lesson: service 'getAllWidgets' is declared twice",
                "lesson: no query key for service 'deleteWidget'",
            ]
        );
    }

    #[test]
    fn test_builtin_registry_is_consistent() {
        let registry = Registry::new();
        assert_eq!(registry.validate(), vec![]);
        assert_eq!(registry.modules().count(), DomainModule::ALL.len());
        for module in DomainModule::ALL {
            assert_eq!(registry.get(module).map(|spec| spec.module), Some(module));
        }
        assert_eq!(
            registry.find_module("student").map(|spec| spec.title()),
            Some("Students")
        );
    }
}
