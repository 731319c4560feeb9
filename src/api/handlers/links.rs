//! Handlers for authenticated link management.

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use validator::Validate;

use crate::api::dto::links::{
    CreateLinkRequest, CreateLinkResponse, LinkSummary, ListLinksResponse,
};
use crate::application::services::NewLinkSpec;
use crate::domain::repositories::AccountHandle;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a shortened link for the authenticated account.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/page",
///   "custom_slug": "my-link",          // optional
///   "password": "Secr3tPass",          // optional
///   "expires_at": "2027-01-01T00:00:00Z", // optional
///   "max_clicks": 100                  // optional
/// }
/// ```
///
/// # Errors
///
/// Returns 400 on validation failure and 409 when a custom slug is taken.
pub async fn create_link_handler(
    State(state): State<AppState>,
    Extension(account): Extension<AccountHandle>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<CreateLinkResponse>), AppError> {
    payload.validate()?;

    let spec = NewLinkSpec {
        destination_url: payload.url,
        custom_slug: payload.custom_slug,
        password: payload.password,
        expires_at: payload.expires_at,
        max_clicks: payload.max_clicks,
    };

    let created = state.links.create_link(&account.uid, spec).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateLinkResponse {
            slug: created.slug,
            short_url: created.short_url,
            destination_url: created.destination_url,
        }),
    ))
}

/// Lists the authenticated account's links with decrypted destinations.
///
/// # Endpoint
///
/// `GET /api/links`
pub async fn list_links_handler(
    State(state): State<AppState>,
    Extension(account): Extension<AccountHandle>,
) -> Result<Json<ListLinksResponse>, AppError> {
    let links = state.links.list_links(&account.uid).await?;

    let items: Vec<LinkSummary> = links
        .into_iter()
        .map(|link| LinkSummary {
            slug: link.slug,
            short_url: link.short_url,
            destination_url: link.destination_url,
            clicks: link.clicks,
            created_at: link.created_at,
            password_protected: link.password_protected,
            expires_at: link.expires_at,
            max_clicks: link.max_clicks,
        })
        .collect();

    Ok(Json(ListLinksResponse {
        total: items.len(),
        items,
    }))
}

/// Deletes an owned link (record and index entry).
///
/// # Endpoint
///
/// `DELETE /api/links/{slug}`
///
/// # Errors
///
/// Returns 404 for an unknown slug and 403 when the caller is not the owner.
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Extension(account): Extension<AccountHandle>,
    Path(slug): Path<String>,
) -> Result<StatusCode, AppError> {
    state.links.delete_link(&account.uid, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
