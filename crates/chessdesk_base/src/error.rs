use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use tracing_error::{SpanTrace, SpanTraceStatus};

/* 📖 # Why a custom error type and not anyhow/eyre/thiserror?

- Control over how errors render in logs and HTTP error bodies
- Span traces are captured once, at the point where the error is created
- Context and causes render as a readable tree instead of a flat string
 */

/// Error variants that can occur in chessdesk operations.
#[derive(Debug)]
pub enum ErrorKind {
    /// File system operation failed
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Catch-all for other errors with a message
    Message { message: String },
}

/* 📖 # Why separate ErrorKind and DeskError?

ErrorKind carries the structural variant callers can match on. DeskError wraps it
with the runtime context stack, an optional cause and the span trace. Context is
pushed while the error propagates, so no nested strings are built along the way.
*/

/// Error type wrapping an [`ErrorKind`] with context, cause and span trace.
pub struct DeskError {
    kind: ErrorKind,
    context: Vec<String>,
    cause: Option<Box<DeskError>>,
    span_trace: SpanTrace,
}

impl DeskError {
    /// Creates a new error from an ErrorKind, capturing the current span trace.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
            cause: None,
            span_trace: SpanTrace::capture(),
        }
    }

    /// Creates a message error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    /// Attaches context to an error.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attaches lazily built context to an error.
    pub fn with_context<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.context.push(f());
        self
    }

    /// Records the error that caused this one.
    pub fn caused_by(mut self, cause: DeskError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Returns a reference to the underlying ErrorKind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the attached context, oldest first.
    pub fn get_context(&self) -> &[String] {
        &self.context
    }

    /// Returns the error that caused this one, if any.
    pub fn cause(&self) -> Option<&DeskError> {
        self.cause.as_deref()
    }

    /// Returns the span trace captured when the error was created.
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// The message of this error without any context, as shown to API clients.
    pub fn bare_message(&self) -> String {
        match &self.kind {
            ErrorKind::FileError { path, source } => {
                format!("File error at {}: {}", path.display(), source)
            }
            ErrorKind::Message { message } => message.clone(),
        }
    }

    /// Returns the innermost error in the source chain.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: &str) -> fmt::Result {
        writeln!(f, "{}", self.bare_message())?;
        let item_count = self.context.len() + usize::from(self.cause.is_some());
        for (index, ctx) in self.context.iter().enumerate() {
            let branch = if index + 1 == item_count {
                "└─"
            } else {
                "├─"
            };
            writeln!(f, "{indent}{branch} {ctx}")?;
        }
        if let Some(cause) = &self.cause {
            write!(f, "{indent}└─ cause: ")?;
            cause.fmt_tree(f, &format!("{indent}   "))?;
        }
        Ok(())
    }
}

impl From<ErrorKind> for DeskError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl StdError for DeskError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::FileError { source, .. } => Some(source),
            ErrorKind::Message { .. } => self
                .cause
                .as_deref()
                .map(|cause| cause as &(dyn StdError + 'static)),
        }
    }
}

impl fmt::Display for DeskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ctx in &self.context {
            write!(f, "{}: ", ctx)?;
        }
        write!(f, "{}", self.bare_message())
    }
}

impl fmt::Debug for DeskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, "")?;
        if self.span_trace.status() == SpanTraceStatus::CAPTURED {
            writeln!(f, "Trace: {}", self.span_trace)?;
        }
        Ok(())
    }
}

/* 📖 # Why use Box<DeskError> in the result type?

The error carries a context vector and a span trace, boxing keeps the Ok path of
every result small.
*/

/// Standard result type for chessdesk operations.
pub type DeskResult<T> = std::result::Result<T, Box<DeskError>>;

/// Extension trait for attaching context to results during propagation.
pub trait ResultExt<T> {
    /// Attaches context to an error.
    fn context(self, context: impl Into<String>) -> DeskResult<T>;

    /// Attaches context that is only built if the result is an error.
    fn with_context<F>(self, f: F) -> DeskResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for DeskResult<T> {
    fn context(self, context: impl Into<String>) -> DeskResult<T> {
        self.map_err(|err| Box::new(err.context(context)))
    }

    fn with_context<F>(self, f: F) -> DeskResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new(err.with_context(f)))
    }
}

/// Builds a boxed message error from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Box::new($crate::DeskError::message(format!($($arg)*)))
    };
}

/// Returns early with a boxed message error built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::err!($($arg)*))
    };
}
