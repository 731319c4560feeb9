//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /go?slug={slug}` - resolve and redirect (public)
//! - `POST /go/{slug}`      - password attempt for a gated link (public)
//! - `GET  /health`         - store reachability (public)
//! - `/api/*`               - link management (bearer session required)
//!
//! # Middleware
//!
//! - **Tracing** - structured request/response logging
//! - **Authentication** - bearer session verified against the account
//!   directory on `/api` routes
//! - **Path normalization** - trailing slash handling

use axum::routing::{get, post};
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api;
use crate::api::handlers::{health_handler, resolve_handler, unlock_handler};
use crate::api::middleware::{auth, tracing};
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let router = Router::new()
        .route("/go", get(resolve_handler))
        .route("/go/{slug}", post(unlock_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
