//! Repository trait for link record and index access.

use crate::domain::entities::{LinkRecord, UserIndexEntry};
use crate::infrastructure::store::StoreError;
use async_trait::async_trait;

/// Repository interface for link records and the per-user slug index.
///
/// # Contracts
///
/// - `create` is the uniqueness authority for slugs: it must be a conditional
///   write that reports `false` when the slug is already taken, never a
///   check-then-set round trip.
/// - `increment_clicks` must be atomic at the store boundary; concurrent
///   resolutions of one slug must not lose increments.
/// - Record and index mutations are issued by the same caller; the record is
///   authoritative, the index exists for listing and deletion.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::StoreLinkRepository`] - backed by
///   a [`DocumentStore`](crate::infrastructure::store::DocumentStore)
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Loads the record for `slug`.
    ///
    /// Returns `Ok(None)` when the slug is absent. Soft-deleted records are
    /// returned as-is; callers decide what inactive means for them.
    async fn get(&self, slug: &str) -> Result<Option<LinkRecord>, StoreError>;

    /// Checks whether a record exists for `slug`.
    ///
    /// Advisory only: a `false` answer can be stale by the time a caller
    /// acts on it. Use [`Self::create`] to actually reserve a slug.
    async fn exists(&self, slug: &str) -> Result<bool, StoreError>;

    /// Conditionally creates a record under its slug.
    ///
    /// Returns `Ok(false)` when the slug is already occupied, in which case
    /// nothing was written and the caller retries with a fresh slug.
    async fn create(&self, record: &LinkRecord) -> Result<bool, StoreError>;

    /// Atomically increments the record's click counter by one.
    ///
    /// Returns the counter value after the increment.
    async fn increment_clicks(&self, slug: &str) -> Result<u64, StoreError>;

    /// Removes the record for `slug`. Removing an absent slug is not an
    /// error.
    async fn remove(&self, slug: &str) -> Result<(), StoreError>;

    /// Writes the owner's index entry for `slug`.
    async fn put_index_entry(
        &self,
        owner_id: &str,
        slug: &str,
        entry: &UserIndexEntry,
    ) -> Result<(), StoreError>;

    /// Removes the owner's index entry for `slug`.
    async fn remove_index_entry(&self, owner_id: &str, slug: &str) -> Result<(), StoreError>;

    /// Lists the slugs recorded in the owner's index.
    async fn list_owned_slugs(&self, owner_id: &str) -> Result<Vec<String>, StoreError>;
}
