//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::api::dto::health::HealthResponse;
use crate::state::AppState;

/// Reports service health.
///
/// # Endpoint
///
/// `GET /health`
///
/// Always answers 200; `store: false` with status `degraded` signals that
/// the document store did not respond.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_ok = state.store.health_check().await;

    Json(HealthResponse {
        status: if store_ok { "ok" } else { "degraded" },
        store: store_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}
