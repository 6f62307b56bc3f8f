/* 📖 # How does the console service route requests?

The service owns one mounted `DocumentationPage` per domain module and routes
on the decoded path segments:

- `GET /api/site` → title, session state and module list
- `GET /api/modules` → module summaries with endpoint counts
- `GET /api/modules/{module}` → endpoint descriptors and current form states
- `POST /api/modules/{module}/execute/{service}` → submit a form
- `GET /docs/{module}` → plain-text rendering of the page

The execute body is a JSON object of raw inputs; fields it leaves out take
their sample values, whatever earlier requests sent. A submission answers with the
`ExecutionResult` as JSON, including failed results, which are still HTTP
200. Field errors are HTTP 400, a submission while the same form is busy is
HTTP 409.

Every module but authentication needs a logged-in session (HTTP 401). Paths
the service does not know are returned as errors, which the PAL turns into
HTTP 599.
*/

use std::collections::BTreeMap;

use chessdesk_base::pal::http::{
    HttpBody, HttpMethod, HttpRequest, HttpResponse, HttpService, HttpStatusCode,
};
use chessdesk_base::{DeskResult, bail, err};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use crate::context::ConsoleContext;
use crate::documentation::DocumentationPage;
use crate::endpoint::EndpointDescriptor;
use crate::form::{FormOutcome, FormSnapshot};
use crate::registry::{DomainModule, ModuleSpec, Registry};
use crate::session::{SessionHandle, SessionUser};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SiteResponse<'a> {
    title: &'a str,
    authenticated: bool,
    user: Option<SessionUser>,
    modules: Vec<ModuleSummary>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModuleSummary {
    id: &'static str,
    title: &'static str,
    endpoints: usize,
    requires_session: bool,
    available: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModuleResponse {
    id: &'static str,
    title: &'static str,
    endpoints: &'static [EndpointDescriptor],
    forms: Vec<FormSnapshot>,
}

/// HTTP front end of the console.
pub struct ConsoleService {
    title: String,
    registry: Registry,
    session: SessionHandle,
    pages: BTreeMap<DomainModule, DocumentationPage>,
}

impl ConsoleService {
    /// Mount a documentation page for every module of `registry`.
    pub fn new(title: impl Into<String>, registry: Registry, context: &ConsoleContext) -> Self {
        let pages = registry
            .modules()
            .map(|spec| (spec.module, DocumentationPage::mount(spec, context)))
            .collect();
        Self {
            title: title.into(),
            registry,
            session: context.session.clone(),
            pages,
        }
    }

    fn json_response<T: Serialize>(status: HttpStatusCode, data: &T) -> DeskResult<HttpResponse> {
        serde_json::to_string(data)
            .map(|body| HttpResponse::json(body).with_status(status))
            .map_err(|e| err!("JSON serialization error: {}", e))
    }

    fn error_response(status: HttpStatusCode, message: impl Into<String>) -> HttpResponse {
        let message = message.into();
        warn!(status = status.as_u16(), %message, "request refused");
        HttpResponse::json(json!({ "error": message }).to_string()).with_status(status)
    }

    fn is_available(&self, module: DomainModule) -> bool {
        !module.requires_session() || self.session.is_authenticated()
    }

    fn summaries(&self) -> Vec<ModuleSummary> {
        self.registry
            .modules()
            .map(|spec| ModuleSummary {
                id: spec.module.id(),
                title: spec.title(),
                endpoints: spec.endpoints.len(),
                requires_session: spec.module.requires_session(),
                available: self.is_available(spec.module),
            })
            .collect()
    }

    /// The module named `id` and its page, or the response refusing access.
    fn open(&self, id: &str) -> Result<(&'static ModuleSpec, &DocumentationPage), HttpResponse> {
        let page = self
            .registry
            .find_module(id)
            .and_then(|spec| self.pages.get(&spec.module).map(|page| (spec, page)));
        let Some((spec, page)) = page else {
            return Err(Self::error_response(
                HttpStatusCode::NotFound,
                format!("Unknown module: {}", id),
            ));
        };
        if !self.is_available(spec.module) {
            return Err(Self::error_response(
                HttpStatusCode::Unauthorized,
                "Authentication required",
            ));
        }
        Ok((spec, page))
    }

    fn handle_site(&self) -> DeskResult<HttpResponse> {
        let response = SiteResponse {
            title: &self.title,
            authenticated: self.session.is_authenticated(),
            user: self.session.current(),
            modules: self.summaries(),
        };
        Self::json_response(HttpStatusCode::Ok, &response)
    }

    fn handle_module(&self, id: &str) -> DeskResult<HttpResponse> {
        let (spec, page) = match self.open(id) {
            Ok(opened) => opened,
            Err(refused) => return Ok(refused),
        };
        let response = ModuleResponse {
            id: spec.module.id(),
            title: spec.title(),
            endpoints: spec.endpoints,
            forms: page.forms().iter().map(|form| form.snapshot()).collect(),
        };
        Self::json_response(HttpStatusCode::Ok, &response)
    }

    fn handle_execute(&self, id: &str, service: &str, body: &HttpBody) -> DeskResult<HttpResponse> {
        let page = match self.open(id) {
            Ok((_, page)) => page,
            Err(refused) => return Ok(refused),
        };
        let overrides = match parse_overrides(body) {
            Ok(overrides) => overrides,
            Err(message) => return Ok(Self::error_response(HttpStatusCode::BadRequest, message)),
        };
        match page.submit(service, &overrides) {
            Ok(FormOutcome::Result(result)) => {
                info!(module = id, service, success = result.is_success(), "executed endpoint");
                Self::json_response(HttpStatusCode::Ok, &result)
            }
            Ok(outcome @ FormOutcome::FieldErrors(_)) => {
                Self::json_response(HttpStatusCode::BadRequest, &outcome)
            }
            Err(busy) => Ok(Self::error_response(HttpStatusCode::Conflict, busy.to_string())),
        }
    }

    fn handle_docs(&self, id: &str) -> DeskResult<HttpResponse> {
        Ok(match self.open(id) {
            Ok((_, page)) => HttpResponse::text(page.render()),
            Err(refused) => refused,
        })
    }
}

/// Raw form inputs from an execute body; non-string values are taken as their JSON text.
fn parse_overrides(body: &HttpBody) -> Result<BTreeMap<String, String>, String> {
    if body.is_empty() {
        return Ok(BTreeMap::new());
    }
    let value: Value = serde_json::from_slice(body.as_bytes())
        .map_err(|e| format!("Request body is not valid JSON: {}", e))?;
    let Value::Object(fields) = value else {
        return Err("Request body must be a JSON object".to_string());
    };
    Ok(fields
        .into_iter()
        .map(|(name, value)| {
            let raw = match value {
                Value::String(text) => text,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (name, raw)
        })
        .collect())
}

fn decode_segments(route: &str) -> DeskResult<Vec<String>> {
    route
        .trim_start_matches('/')
        .split('/')
        .map(|segment| {
            percent_decode_str(segment)
                .decode_utf8()
                .map(|decoded| decoded.into_owned())
                .map_err(|e| err!("Invalid path segment '{}': {}", segment, e))
        })
        .collect()
}

impl std::fmt::Debug for ConsoleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleService")
            .field("title", &self.title)
            .field("pages", &self.pages.len())
            .finish()
    }
}

impl HttpService for ConsoleService {
    #[instrument(skip_all, fields(method = %request.method(), route = request.route()))]
    fn handle_request(&self, request: HttpRequest) -> DeskResult<HttpResponse> {
        let segments = decode_segments(request.route())?;
        let parts: Vec<&str> = segments.iter().map(String::as_str).collect();
        debug!(?parts, "routing request");

        match (*request.method(), parts.as_slice()) {
            (HttpMethod::Get, ["api", "site"]) => self.handle_site(),
            (HttpMethod::Get, ["api", "modules"]) => {
                Self::json_response(HttpStatusCode::Ok, &self.summaries())
            }
            (HttpMethod::Get, ["api", "modules", module]) => self.handle_module(module),
            (HttpMethod::Post, ["api", "modules", module, "execute", service]) => {
                self.handle_execute(module, service, request.body())
            }
            (HttpMethod::Get, ["docs", module]) => self.handle_docs(module),
            _ => bail!("Invalid API endpoint: {} {}", request.method(), request.route()),
        }
    }
}
