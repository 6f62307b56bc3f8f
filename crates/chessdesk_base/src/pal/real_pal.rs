use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use crate::{DeskError, DeskResult, error::ErrorKind};

use super::FilePath;
use super::http::{
    HttpMethod, HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService,
    HttpStatusCode,
};
use super::traits::Pal;

/* 📖 # Why tiny_http with a thread per request?

The console serves a handful of operators. tiny_http keeps the server
synchronous, and handing each request to its own thread means a slow binding
call on one endpoint form never holds up requests for another. The accept loop
polls with a timeout so it notices the shutdown flag.
*/

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// PAL implementation backed by std::fs and tiny_http.
///
/// File paths are resolved relative to the configured base directory.
#[derive(Debug)]
pub struct RealPal {
    base_dir: PathBuf,
}

impl RealPal {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn resolve_path(&self, path: &FilePath) -> PathBuf {
        path.resolve_against(&self.base_dir)
    }
}

impl Pal for RealPal {
    #[instrument(skip(self), fields(path = %path))]
    fn file_exists(&self, path: &FilePath) -> DeskResult<bool> {
        let resolved = self.resolve_path(path);
        let exists = resolved.exists();
        debug!(exists, resolved = %resolved.display(), "checked file existence");
        Ok(exists)
    }

    #[instrument(skip(self), fields(path = %path))]
    fn read_file(&self, path: &FilePath) -> DeskResult<Box<dyn Read + 'static>> {
        let resolved = self.resolve_path(path);
        debug!(resolved = %resolved.display(), "opening file for reading");
        let file = fs::File::open(&resolved).map_err(|e| {
            debug!(error = %e, "failed to open file");
            Box::new(DeskError::new(ErrorKind::FileError {
                path: resolved,
                source: e,
            }))
        })?;
        Ok(Box::new(file))
    }

    #[instrument(skip(self, service), fields(address = %config.address()))]
    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> DeskResult<HttpServerHandle> {
        let server = tiny_http::Server::http(config.address())
            .map_err(|e| crate::err!("Failed to bind {}: {}", config.address(), e))?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| crate::err!("Server is not listening on an IP address"))?;

        let handle = HttpServerHandle::new(port);
        let shutdown = handle.shutdown_flag();
        let service: Arc<dyn HttpService> = Arc::from(service);
        let server_name = config.server_name.clone();

        thread::Builder::new()
            .name(format!("{}-accept", server_name))
            .spawn(move || accept_loop(server, service, shutdown))
            .map_err(|e| crate::err!("Failed to spawn accept thread: {}", e))?;

        info!(port, server = %server_name, "HTTP server listening");
        Ok(handle)
    }
}

fn accept_loop(server: tiny_http::Server, service: Arc<dyn HttpService>, shutdown: Arc<AtomicBool>) {
    while !shutdown.load(Ordering::SeqCst) {
        match server.recv_timeout(ACCEPT_POLL_INTERVAL) {
            Ok(Some(request)) => {
                let service = service.clone();
                thread::spawn(move || serve_request(service.as_ref(), request));
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "failed to accept HTTP request");
            }
        }
    }
    info!("HTTP server stopped");
}

fn serve_request(service: &dyn HttpService, mut raw: tiny_http::Request) {
    let response = match convert_request(&mut raw) {
        Ok(request) => {
            debug!(method = %request.method(), path = request.path(), "handling request");
            service.handle_request(request).unwrap_or_else(|e| {
                warn!(error = %e, "service returned an error");
                HttpResponse::service_error(&e)
            })
        }
        Err(e) => {
            warn!(error = %e, "rejected malformed request");
            HttpResponse::service_error(&e).with_status(HttpStatusCode::BadRequest)
        }
    };

    let status = response.status().as_u16();
    let mut reply = tiny_http::Response::from_data(response.body().as_bytes().to_vec())
        .with_status_code(status);
    for (key, value) in response.headers().iter() {
        match tiny_http::Header::from_bytes(key.as_bytes(), value.as_bytes()) {
            Ok(header) => reply = reply.with_header(header),
            Err(()) => warn!(header = %key, "dropping invalid response header"),
        }
    }
    if let Err(e) = raw.respond(reply) {
        warn!(error = %e, "failed to send response");
    }
}

fn convert_request(raw: &mut tiny_http::Request) -> DeskResult<HttpRequest> {
    let method = HttpMethod::parse(raw.method().as_str())
        .ok_or_else(|| crate::err!("Unsupported HTTP method: {}", raw.method()))?;
    let mut body = Vec::new();
    raw.as_reader()
        .read_to_end(&mut body)
        .map_err(|e| crate::err!("Failed to read request body: {}", e))?;

    let mut request = HttpRequest::new(method, raw.url()).with_body(body);
    for header in raw.headers() {
        request = request.with_header(header.field.as_str().as_str(), header.value.as_str());
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_dir() -> (TempDir, RealPal) {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let pal = RealPal::new(temp_dir.path().to_path_buf());
        (temp_dir, pal)
    }

    #[test]
    fn test_file_exists() {
        let (temp_dir, pal) = setup_test_dir();
        fs::write(temp_dir.path().join("chessdesk.toml"), "title = \"x\"").unwrap();

        assert!(pal.file_exists(&FilePath::from("chessdesk.toml")).unwrap());
        assert!(!pal.file_exists(&FilePath::from("missing.toml")).unwrap());
    }

    #[test]
    fn test_read_file_to_string() {
        let (temp_dir, pal) = setup_test_dir();
        fs::create_dir(temp_dir.path().join("conf")).unwrap();
        fs::write(temp_dir.path().join("conf/chessdesk.toml"), "title = \"Club\"").unwrap();

        let content = pal
            .read_file_to_string(&FilePath::from("conf/chessdesk.toml"))
            .unwrap();
        assert_eq!(content, "title = \"Club\"");
    }

    #[test]
    fn test_read_file_not_found() {
        let (_temp_dir, pal) = setup_test_dir();
        let error = pal
            .read_file(&FilePath::from("nonexistent.toml"))
            .err()
            .unwrap();
        assert!(matches!(error.kind(), ErrorKind::FileError { .. }));
    }
}
