pub mod repository_trait;
pub mod field_case;
pub mod tables;
pub mod memory_store;
pub mod http_store;

pub use repository_trait::*;
pub use tables::*;
pub use memory_store::MemoryStore;
pub use http_store::HttpStore;
