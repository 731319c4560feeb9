//! HTTP server initialization and runtime setup.
//!
//! Wires the document store client, the account directory, the services, and
//! the Axum server lifecycle.

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::crypto::keys::Keyring;
use crate::domain::repositories::AccountDirectory;
use crate::infrastructure::directory::RestAccountDirectory;
use crate::infrastructure::persistence::StoreLinkRepository;
use crate::infrastructure::store::{DocumentStore, RestDocumentStore};
use crate::application::services::{LinkService, ResolverService};
use crate::routes::app_router;
use crate::state::AppState;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Document store REST client (with a startup health probe)
/// - Account directory REST client
/// - Resolver and link services over the shared repository
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// # Errors
///
/// Returns an error if the directory configuration is missing, a client
/// cannot be built, or the server fails to bind.
pub async fn run(config: Config) -> Result<()> {
    let timeout = Duration::from_secs(config.store_timeout_seconds);

    let store: Arc<dyn DocumentStore> = Arc::new(RestDocumentStore::connect(
        &config.store_url,
        config.store_auth_token.clone(),
        timeout,
    )?);

    if store.health_check().await {
        tracing::info!("Connected to document store");
    } else {
        tracing::warn!("Document store health check failed; continuing startup");
    }

    let directory_url = config
        .directory_url
        .clone()
        .context("DIRECTORY_URL must be set to serve the API")?;
    let directory_api_key = config
        .directory_api_key
        .clone()
        .context("DIRECTORY_API_KEY must be set to serve the API")?;

    let directory: Arc<dyn AccountDirectory> = Arc::new(RestAccountDirectory::connect(
        &directory_url,
        &directory_api_key,
        timeout,
    )?);

    let records = Arc::new(StoreLinkRepository::new(store.clone()));
    let keyring = Keyring::new(config.link_key_secret.clone());

    let resolver = Arc::new(ResolverService::new(records.clone(), keyring.clone()));
    let links = Arc::new(LinkService::new(
        records,
        keyring,
        config.base_url.clone(),
        config.slug_length,
    ));

    let state = AppState {
        resolver,
        links,
        directory,
        store,
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
