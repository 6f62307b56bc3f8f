/* 📖 # How is the console engine laid out?

Bottom up:

- `endpoint`, `query_key` and `result` are the plain data the rest is built from
- `cache` and `store` hold query results and domain records behind traits
- `binding` turns closures into query and mutation handles per service name
- `dispatcher` runs one submission against a `BindingSet`
- `form` and `documentation` keep the interactive state of every endpoint
- `registry` and `domain` declare the modules of the chess school
- `api` exposes all of it over HTTP
*/

pub mod api;
pub mod binding;
pub mod cache;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod documentation;
pub mod domain;
pub mod endpoint;
pub mod form;
pub mod query_key;
pub mod registry;
pub mod result;
pub mod session;
pub mod store;

pub use api::ConsoleService;
pub use binding::{BindingSet, MutationBinding, Params, QueryBinding, QueryState, Resolved};
pub use cache::{CacheEntry, CacheHandle, QueryCache, QueryClient};
pub use config::{Config, ServerConfig, UserConfig, load_config, seed_users};
pub use context::ConsoleContext;
pub use dispatcher::Dispatcher;
pub use documentation::DocumentationPage;
pub use endpoint::{EndpointDescriptor, ParamType, ParameterSpec, SampleValue};
pub use form::{EndpointForm, FieldError, FieldInput, FormError, FormOutcome, FormSnapshot};
pub use query_key::QueryKey;
pub use registry::{DomainModule, ModuleSpec, QueryKeyTable, Registry, RegistryIssue};
pub use result::ExecutionResult;
pub use session::{SessionHandle, SessionUser};
pub use store::{InMemoryRecordStore, Record, RecordStore, RecordStoreHandle};
