/* 📖 # What is the Platform Abstraction Layer?

The PAL is the seam between the console and the machine it runs on: reading the
configuration file and serving HTTP. Code depends on the `Pal` trait; RealPal
talks to std::fs and tiny_http, MockPal keeps files and servers in memory.
*/

mod file_path;
pub mod http;
pub mod mock;
pub mod real_pal;
mod traits;

pub use file_path::FilePath;
pub use mock::MockPal;
pub use real_pal::RealPal;
pub use traits::{Pal, PalHandle};
