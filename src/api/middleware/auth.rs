//! Bearer session authentication middleware.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_auth::AuthBearer;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticates API requests against the account directory.
///
/// # Flow
///
/// 1. Extract the bearer token from the `Authorization` header
/// 2. Resolve it to an account via
///    [`AccountDirectory::verify_session`](crate::domain::repositories::AccountDirectory::verify_session)
/// 3. Insert the [`AccountHandle`](crate::domain::repositories::AccountHandle)
///    into request extensions for handlers
///
/// # Errors
///
/// Responds 401 when the directory rejects the token and 503 when the
/// directory is unreachable.
pub async fn layer(
    State(state): State<AppState>,
    AuthBearer(token): AuthBearer,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let account = state.directory.verify_session(&token).await?;
    debug!(uid = %account.uid, "session verified");

    request.extensions_mut().insert(account);
    Ok(next.run(request).await)
}
