//! Handlers for the redirect entry point.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;
use tracing::debug;

use crate::api::dto::resolve::{ResolveQuery, UnlockRequest, UnlockResponse};
use crate::application::services::ResolveOutcome;
use crate::error::AppError;
use crate::state::AppState;

/// Resolves a slug and redirects to its destination.
///
/// # Endpoint
///
/// `GET /go?slug={slug}`
///
/// # Responses
///
/// - `307 Temporary Redirect` with `Location` for open links; the click is
///   recorded before the response leaves
/// - `401` with code `password_required` for gated links - the client
///   collects a password and retries via `POST /go/{slug}`
/// - `404` for an absent, deleted, or missing slug parameter
/// - `410` for expired links and exhausted click quotas
/// - `422` when the payload cannot be decrypted (no further detail by
///   design)
pub async fn resolve_handler(
    Query(query): Query<ResolveQuery>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let slug = query.slug.unwrap_or_default();

    match state.resolver.resolve(&slug).await? {
        ResolveOutcome::Resolved(resolved) => {
            debug!(%slug, "redirecting");
            Ok(Redirect::temporary(&resolved.destination_url).into_response())
        }
        ResolveOutcome::PasswordRequired(gate) => Ok(password_required(gate.slug())),
    }
}

/// Verifies one password attempt against a gated link.
///
/// # Endpoint
///
/// `POST /go/{slug}` with body `{"password": "..."}`
///
/// Each attempt is independent: a mismatch answers `401` with
/// `invalid_password` and the client may simply try again. On success the
/// destination is returned as JSON (the client navigates itself) and the
/// click is recorded.
///
/// Submitting a password to an unprotected link resolves it normally.
pub async fn unlock_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<UnlockRequest>,
) -> Result<Json<UnlockResponse>, AppError> {
    match state.resolver.resolve(&slug).await? {
        ResolveOutcome::Resolved(resolved) => Ok(Json(UnlockResponse {
            destination_url: resolved.destination_url,
        })),
        ResolveOutcome::PasswordRequired(gate) => {
            let resolved = gate.submit(&body.password).await?;
            Ok(Json(UnlockResponse {
                destination_url: resolved.destination_url,
            }))
        }
    }
}

fn password_required(slug: &str) -> Response {
    let body = json!({
        "error": {
            "code": "password_required",
            "message": "This link is password protected",
            "details": { "slug": slug },
        }
    });
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
