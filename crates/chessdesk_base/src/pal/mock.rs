use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use parking_lot::Mutex;

use crate::error::ErrorKind;
use crate::{DeskError, DeskResult};

use super::FilePath;
use super::http::{HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService};
use super::traits::Pal;

/* 📖 # Why does MockPal keep servers in a map instead of binding sockets?

Tests register the console service exactly as the CLI does, then call
`simulate_request` against the assigned port. The request goes straight into the
service, errors are converted to HTTP 599 the same way RealPal converts them, and
no test ever opens a socket.
*/

/// In-memory PAL implementation for testing.
///
/// ```
/// use chessdesk_base::{FilePath, MockPal, Pal};
///
/// let mock = MockPal::new();
/// mock.add_file(FilePath::from("chessdesk.toml"), b"title = \"Club\"".to_vec());
/// let content = mock.read_file_to_string(&FilePath::from("chessdesk.toml")).unwrap();
/// assert_eq!(content, "title = \"Club\"");
/// ```
#[derive(Debug, Clone)]
pub struct MockPal {
    files: Arc<Mutex<HashMap<FilePath, Vec<u8>>>>,
    http_servers: Arc<Mutex<HashMap<u16, Arc<dyn HttpService>>>>,
    next_port: Arc<AtomicU16>,
}

impl MockPal {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            http_servers: Arc::new(Mutex::new(HashMap::new())),
            next_port: Arc::new(AtomicU16::new(10000)),
        }
    }

    /// Add a file to the mock storage.
    pub fn add_file(&self, path: FilePath, content: Vec<u8>) {
        self.files.lock().insert(path, content);
    }

    /// Send a request to the service registered on `port`.
    ///
    /// Service errors come back as HTTP 599 responses, as they would from RealPal.
    /// Only a missing server is reported as an error.
    pub fn simulate_request(&self, port: u16, request: HttpRequest) -> DeskResult<HttpResponse> {
        let service = self
            .http_servers
            .lock()
            .get(&port)
            .cloned()
            .ok_or_else(|| crate::err!("No HTTP server registered on port {}", port))?;

        Ok(service
            .handle_request(request)
            .unwrap_or_else(|e| HttpResponse::service_error(&e)))
    }

    /// Number of registered HTTP servers.
    pub fn http_server_count(&self) -> usize {
        self.http_servers.lock().len()
    }
}

impl Default for MockPal {
    fn default() -> Self {
        Self::new()
    }
}

impl Pal for MockPal {
    fn file_exists(&self, path: &FilePath) -> DeskResult<bool> {
        Ok(self.files.lock().contains_key(path))
    }

    fn read_file(&self, path: &FilePath) -> DeskResult<Box<dyn Read + 'static>> {
        let files = self.files.lock();
        let content = files.get(path).cloned().ok_or_else(|| {
            Box::new(DeskError::new(ErrorKind::FileError {
                path: path.as_path().to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            }))
        })?;
        Ok(Box::new(Cursor::new(content)))
    }

    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> DeskResult<HttpServerHandle> {
        let port = match config.port {
            Some(p) => p,
            None => self.next_port.fetch_add(1, Ordering::SeqCst),
        };
        let mut servers = self.http_servers.lock();
        if servers.contains_key(&port) {
            crate::bail!("Port {} is already in use", port);
        }
        servers.insert(port, Arc::from(service));
        Ok(HttpServerHandle::new(port))
    }
}
