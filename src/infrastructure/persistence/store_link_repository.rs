//! Document-store implementation of the link repository.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::entities::{LinkRecord, UserIndexEntry};
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::store::{DocumentStore, StoreError};

/// [`LinkRepository`] over a [`DocumentStore`].
///
/// # Persisted layout
///
/// - `links/{slug}` - the full [`LinkRecord`]
/// - `users/{ownerId}/links/{slug}` - the owner's [`UserIndexEntry`]
///
/// Slug uniqueness rides on the store's conditional create; the click counter
/// on its atomic increment. Neither falls back to read-then-write here.
pub struct StoreLinkRepository {
    store: Arc<dyn DocumentStore>,
}

impl StoreLinkRepository {
    /// Creates a repository over a store handle.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn record_path(slug: &str) -> String {
        format!("links/{slug}")
    }

    /// Path of the record's click counter. The segment name must match the
    /// record's camelCase wire form.
    fn clicks_path(slug: &str) -> String {
        format!("links/{slug}/clickCount")
    }

    fn index_path(owner_id: &str, slug: &str) -> String {
        format!("users/{owner_id}/links/{slug}")
    }

    fn index_root(owner_id: &str) -> String {
        format!("users/{owner_id}/links")
    }
}

#[async_trait]
impl LinkRepository for StoreLinkRepository {
    async fn get(&self, slug: &str) -> Result<Option<LinkRecord>, StoreError> {
        match self.store.read(&Self::record_path(slug)).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn exists(&self, slug: &str) -> Result<bool, StoreError> {
        self.store.exists_once(&Self::record_path(slug)).await
    }

    async fn create(&self, record: &LinkRecord) -> Result<bool, StoreError> {
        let value = serde_json::to_value(record)?;
        self.store.create(&Self::record_path(&record.slug), value).await
    }

    async fn increment_clicks(&self, slug: &str) -> Result<u64, StoreError> {
        let count = self.store.increment(&Self::clicks_path(slug), 1).await?;
        Ok(count.max(0) as u64)
    }

    async fn remove(&self, slug: &str) -> Result<(), StoreError> {
        self.store.remove(&Self::record_path(slug)).await
    }

    async fn put_index_entry(
        &self,
        owner_id: &str,
        slug: &str,
        entry: &UserIndexEntry,
    ) -> Result<(), StoreError> {
        let value = serde_json::to_value(entry)?;
        self.store.write(&Self::index_path(owner_id, slug), value).await
    }

    async fn remove_index_entry(&self, owner_id: &str, slug: &str) -> Result<(), StoreError> {
        self.store.remove(&Self::index_path(owner_id, slug)).await
    }

    async fn list_owned_slugs(&self, owner_id: &str) -> Result<Vec<String>, StoreError> {
        let Some(value) = self.store.read(&Self::index_root(owner_id)).await? else {
            return Ok(Vec::new());
        };

        match value.as_object() {
            Some(entries) => Ok(entries.keys().cloned().collect()),
            None => Ok(Vec::new()),
        }
    }
}
