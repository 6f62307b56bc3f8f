use std::io::Read;
use std::sync::Arc;

use crate::DeskResult;
use crate::error::{DeskError, ErrorKind};

use super::file_path::FilePath;
use super::http::{HttpServerConfig, HttpServerHandle, HttpService};

/* 📖 # Why is Pal a trait instead of a struct?

Everything that touches the outside world (reading configuration, binding a
socket) goes through this trait. Production code gets RealPal; tests get MockPal
and stay deterministic without touching the filesystem or the network.
*/

/// Platform Abstraction Layer: filesystem reads and HTTP serving.
pub trait Pal: std::fmt::Debug + Send + Sync + 'static {
    /// Check if a file exists at the given path.
    fn file_exists(&self, path: &FilePath) -> DeskResult<bool>;

    /// Open a file for reading.
    fn read_file(&self, path: &FilePath) -> DeskResult<Box<dyn Read + 'static>>;

    /// Read entire file contents as a UTF-8 string.
    fn read_file_to_string(&self, path: &FilePath) -> DeskResult<String> {
        let mut reader = self.read_file(path)?;
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents).map_err(|e| {
            Box::new(DeskError::new(ErrorKind::FileError {
                path: path.as_path().to_path_buf(),
                source: e,
            }))
        })?;
        String::from_utf8(contents).map_err(|_e| crate::err!("File is not valid UTF-8: {}", path))
    }

    /// Start serving `service` as configured.
    ///
    /// Returns once the server is listening. Dropping the returned handle (or calling
    /// `shutdown()` on it) stops the server from accepting further requests.
    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> DeskResult<HttpServerHandle>;
}

/// Shared handle to a PAL implementation.
///
/// ```
/// use chessdesk_base::{MockPal, PalHandle};
///
/// let pal = PalHandle::new(MockPal::new());
/// let pal_clone = pal.clone();
/// ```
#[derive(Debug, Clone)]
pub struct PalHandle(Arc<dyn Pal>);

impl PalHandle {
    pub fn new(pal: impl Pal + 'static) -> Self {
        Self(Arc::new(pal))
    }
}

impl std::ops::Deref for PalHandle {
    type Target = dyn Pal;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
