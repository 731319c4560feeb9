//! In-process document store backed by a JSON tree.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::document_store::{DocumentStore, StoreResult};

/// In-memory [`DocumentStore`] holding a single JSON tree behind a mutex.
///
/// Every operation takes the one lock, which makes `create` and `increment`
/// naturally atomic. Used as the test double and for local development
/// without a hosted store.
#[derive(Default)]
pub struct MemoryDocumentStore {
    root: Mutex<Value>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            root: Mutex::new(Value::Object(Map::new())),
        }
    }

    fn segments(path: &str) -> Vec<&str> {
        path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Walks to the node at `path`, if present.
    fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
        let mut node = root;
        for segment in Self::segments(path) {
            node = node.as_object()?.get(segment)?;
        }
        Some(node)
    }

    /// Walks to the parent object of `path`, creating intermediate objects,
    /// and returns it together with the final key.
    fn lookup_parent_mut<'a>(root: &'a mut Value, path: &str) -> Option<(&'a mut Map<String, Value>, String)> {
        let segments = Self::segments(path);
        let (last, parents) = segments.split_last()?;

        let mut node = root;
        for segment in parents {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            node = node
                .as_object_mut()
                .expect("just coerced to object")
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }

        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        Some((node.as_object_mut().expect("just coerced to object"), last.to_string()))
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn read(&self, path: &str) -> StoreResult<Option<Value>> {
        let root = self.root.lock().await;
        Ok(Self::lookup(&root, path).cloned())
    }

    async fn write(&self, path: &str, value: Value) -> StoreResult<()> {
        let mut root = self.root.lock().await;
        if let Some((parent, key)) = Self::lookup_parent_mut(&mut root, path) {
            parent.insert(key, value);
        } else {
            *root = value;
        }
        Ok(())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> StoreResult<()> {
        let mut root = self.root.lock().await;
        if let Some((parent, key)) = Self::lookup_parent_mut(&mut root, path) {
            let target = parent
                .entry(key)
                .or_insert_with(|| Value::Object(Map::new()));
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            let object = target.as_object_mut().expect("just coerced to object");
            for (k, v) in fields {
                object.insert(k, v);
            }
        }
        Ok(())
    }

    async fn remove(&self, path: &str) -> StoreResult<()> {
        let mut root = self.root.lock().await;
        if let Some((parent, key)) = Self::lookup_parent_mut(&mut root, path) {
            parent.remove(&key);
        }
        Ok(())
    }

    async fn exists_once(&self, path: &str) -> StoreResult<bool> {
        let root = self.root.lock().await;
        Ok(Self::lookup(&root, path).is_some_and(|v| !v.is_null()))
    }

    async fn create(&self, path: &str, value: Value) -> StoreResult<bool> {
        // Check and write under one lock acquisition: atomic by construction.
        let mut root = self.root.lock().await;
        if Self::lookup(&root, path).is_some_and(|v| !v.is_null()) {
            return Ok(false);
        }
        if let Some((parent, key)) = Self::lookup_parent_mut(&mut root, path) {
            parent.insert(key, value);
        }
        Ok(true)
    }

    async fn increment(&self, path: &str, delta: i64) -> StoreResult<i64> {
        let mut root = self.root.lock().await;
        let current = Self::lookup(&root, path)
            .and_then(Value::as_i64)
            .unwrap_or(0);
        let next = current + delta;
        if let Some((parent, key)) = Self::lookup_parent_mut(&mut root, path) {
            parent.insert(key, Value::from(next));
        }
        Ok(next)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
