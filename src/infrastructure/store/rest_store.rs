//! REST client for a hosted JSON-tree document store.

use async_trait::async_trait;
use reqwest::header::{ETAG, IF_MATCH};
use reqwest::{Client, Method, StatusCode};
use serde_json::{Map, Value};
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::debug;

use super::document_store::{DocumentStore, StoreError, StoreResult};

/// Attempts for ETag compare-and-swap loops before reporting contention.
const CAS_ATTEMPTS: usize = 16;

/// Extra attempts for idempotent reads on transient transport failures.
const READ_RETRIES: usize = 2;

/// [`DocumentStore`] backed by a hosted JSON-tree REST API.
///
/// Every node is addressable as `{base}/{path}.json` and supports
/// `GET`/`PUT`/`PATCH`/`DELETE`. The store hands out an entity tag per node
/// when asked; conditional `create` and atomic `increment` are built on
/// `if-match` writes, retried in a bounded compare-and-swap loop when a
/// concurrent writer wins the race.
///
/// Reads are idempotent and retried with exponential backoff on transport
/// failures; writes are not retried here, the caller decides.
pub struct RestDocumentStore {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl RestDocumentStore {
    /// Builds a store client.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the HTTP client cannot be
    /// constructed.
    pub fn connect(
        base_url: &str,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
        })
    }

    fn node_url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path.trim_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, self.node_url(path));
        if let Some(token) = &self.auth_token {
            builder = builder.query(&[("auth", token.as_str())]);
        }
        builder
    }

    async fn read_once(&self, path: &str) -> StoreResult<Option<Value>> {
        let response = self.request(Method::GET, path).send().await.map_err(transport)?;
        expect_success(response.status())?;

        let value: Value = response.json().await.map_err(transport)?;
        Ok(non_null(value))
    }

    /// Reads a node together with its entity tag.
    async fn read_with_etag(&self, path: &str) -> StoreResult<(Option<Value>, String)> {
        let response = self
            .request(Method::GET, path)
            .header("X-Firebase-ETag", "true")
            .send()
            .await
            .map_err(transport)?;
        expect_success(response.status())?;

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                StoreError::Unavailable("store did not return an entity tag".to_string())
            })?;

        let value: Value = response.json().await.map_err(transport)?;
        Ok((non_null(value), etag))
    }

    /// Writes a node only if its entity tag still matches.
    ///
    /// Returns `Ok(false)` when a concurrent writer invalidated the tag.
    async fn put_if_match(&self, path: &str, value: &Value, etag: &str) -> StoreResult<bool> {
        let response = self
            .request(Method::PUT, path)
            .header(IF_MATCH, etag)
            .json(value)
            .send()
            .await
            .map_err(transport)?;

        if response.status() == StatusCode::PRECONDITION_FAILED {
            return Ok(false);
        }
        expect_success(response.status())?;
        Ok(true)
    }

    fn read_retry_strategy() -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(50).map(jitter).take(READ_RETRIES)
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    async fn read(&self, path: &str) -> StoreResult<Option<Value>> {
        Retry::spawn(Self::read_retry_strategy(), || self.read_once(path)).await
    }

    async fn write(&self, path: &str, value: Value) -> StoreResult<()> {
        let response = self
            .request(Method::PUT, path)
            .json(&value)
            .send()
            .await
            .map_err(transport)?;
        expect_success(response.status())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> StoreResult<()> {
        let response = self
            .request(Method::PATCH, path)
            .json(&Value::Object(fields))
            .send()
            .await
            .map_err(transport)?;
        expect_success(response.status())
    }

    async fn remove(&self, path: &str) -> StoreResult<()> {
        let response = self
            .request(Method::DELETE, path)
            .send()
            .await
            .map_err(transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        expect_success(response.status())
    }

    async fn exists_once(&self, path: &str) -> StoreResult<bool> {
        let probe = || async {
            let response = self
                .request(Method::GET, path)
                .query(&[("shallow", "true")])
                .send()
                .await
                .map_err(transport)?;
            expect_success(response.status())?;

            let value: Value = response.json().await.map_err(transport)?;
            Ok(!value.is_null())
        };

        Retry::spawn(Self::read_retry_strategy(), probe).await
    }

    async fn create(&self, path: &str, value: Value) -> StoreResult<bool> {
        let (current, etag) = self.read_with_etag(path).await?;
        if current.is_some() {
            return Ok(false);
        }

        // The tag pins the observed-absent state; a concurrent creator
        // invalidates it and our write comes back 412.
        let created = self.put_if_match(path, &value, &etag).await?;
        if !created {
            debug!(path, "conditional create lost to a concurrent writer");
        }
        Ok(created)
    }

    async fn increment(&self, path: &str, delta: i64) -> StoreResult<i64> {
        for attempt in 0..CAS_ATTEMPTS {
            let (current, etag) = self.read_with_etag(path).await?;
            let next = current.as_ref().and_then(Value::as_i64).unwrap_or(0) + delta;

            if self.put_if_match(path, &Value::from(next), &etag).await? {
                return Ok(next);
            }
            debug!(path, attempt, "increment lost compare-and-swap, retrying");
        }

        Err(StoreError::Contention)
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/.json", self.base_url);
        let mut builder = self.client.get(url).query(&[("shallow", "true")]);
        if let Some(token) = &self.auth_token {
            builder = builder.query(&[("auth", token.as_str())]);
        }

        match builder.send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

fn transport(e: reqwest::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn expect_success(status: StatusCode) -> StoreResult<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(StoreError::Unavailable(format!(
            "store returned status {status}"
        )))
    }
}

fn non_null(value: Value) -> Option<Value> {
    if value.is_null() { None } else { Some(value) }
}
