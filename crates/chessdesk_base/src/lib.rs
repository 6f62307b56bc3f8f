/* 📖 # Why have chessdesk_base as a core library?
chessdesk_base holds the error type, tracing setup and the platform abstraction layer
shared by the engine and the CLI, so neither depends on the other for plumbing.
*/

pub mod error;
mod error_tests;
pub mod pal;
pub mod tracing;

// Re-export commonly used types for convenience
pub use error::{DeskError, DeskResult, ErrorKind, ResultExt};
pub use pal::{FilePath, MockPal, Pal, PalHandle, RealPal};
