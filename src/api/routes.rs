//! API route composition.

use axum::Router;
use axum::routing::{delete, post};

use crate::api::handlers::{create_link_handler, delete_link_handler, list_links_handler};
use crate::state::AppState;

/// Routes that require a verified bearer session.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/links", post(create_link_handler).get(list_links_handler))
        .route("/links/{slug}", delete(delete_link_handler))
}
