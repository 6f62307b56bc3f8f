pub mod memory;
pub mod traits;

pub use memory::QueryClient;
pub use traits::{CacheEntry, CacheHandle, QueryCache};
