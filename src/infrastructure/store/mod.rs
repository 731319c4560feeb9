//! Document store abstractions and implementations.
//!
//! - [`document_store`] - the [`DocumentStore`] trait and [`StoreError`]
//! - [`rest_store`] - hosted JSON-tree REST client with ETag compare-and-swap
//! - [`memory_store`] - in-process tree for tests and local development

pub mod document_store;
pub mod memory_store;
pub mod rest_store;

pub use document_store::{DocumentStore, StoreError, StoreResult};
pub use memory_store::MemoryDocumentStore;
pub use rest_store::RestDocumentStore;
