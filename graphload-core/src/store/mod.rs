pub mod http;
pub mod memory;
mod traits;

pub use http::HttpDocumentStore;
pub use memory::InMemoryStore;
pub use traits::{DocumentStore, PartitionKey, WriteReceipt};
