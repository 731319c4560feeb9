//! Document store trait and error types.

use async_trait::async_trait;
use serde_json::Value;

/// Errors surfaced by document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Transport-level failure. Surfaced to the caller for retry/backoff;
    /// the adapter does not retry non-idempotent operations internally.
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// A conditional update kept losing against concurrent writers.
    #[error("document store contention: conditional update kept failing")]
    Contention,

    /// A stored document did not match its expected shape.
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A hierarchical JSON document tree addressed by slash-separated paths.
///
/// This is the transport boundary to the hosted store. Two operations go
/// beyond plain key-value access and carry the consistency contracts the
/// link pipeline depends on:
///
/// - [`create`](Self::create) - conditional write, the uniqueness authority
///   for slug reservation
/// - [`increment`](Self::increment) - atomic counter update; concurrent
///   increments must never lose updates
///
/// # Implementations
///
/// - [`crate::infrastructure::store::RestDocumentStore`] - hosted JSON-tree
///   REST API with ETag compare-and-swap
/// - [`crate::infrastructure::store::MemoryDocumentStore`] - in-process tree
///   for tests
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads the value at `path`. `Ok(None)` when the path is absent.
    async fn read(&self, path: &str) -> StoreResult<Option<Value>>;

    /// Writes `value` at `path`, replacing any existing value.
    async fn write(&self, path: &str, value: Value) -> StoreResult<()>;

    /// Shallow-merges `fields` into the object at `path`.
    async fn update(&self, path: &str, fields: serde_json::Map<String, Value>) -> StoreResult<()>;

    /// Removes the value at `path`. Removing an absent path is not an error.
    async fn remove(&self, path: &str) -> StoreResult<()>;

    /// One-shot existence check. Advisory: may be stale by the time the
    /// caller acts on it.
    async fn exists_once(&self, path: &str) -> StoreResult<bool>;

    /// Writes `value` at `path` only if the path is currently absent.
    ///
    /// Returns `Ok(false)` without writing when the path is occupied,
    /// including when a concurrent writer got there first.
    async fn create(&self, path: &str, value: Value) -> StoreResult<bool>;

    /// Atomically adds `delta` to the integer at `path` (absent counts as
    /// zero) and returns the new value.
    async fn increment(&self, path: &str, delta: i64) -> StoreResult<i64>;

    /// Checks if the store backend is reachable.
    async fn health_check(&self) -> bool;
}
