//! DTOs for the resolve and unlock endpoints.

use serde::{Deserialize, Serialize};

/// Query parameters of the redirect entry point.
///
/// `slug` is optional at the type level so a missing parameter reaches the
/// handler and is reported as not-found instead of a generic extractor
/// rejection.
#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub slug: Option<String>,
}

/// One password attempt against a gated link.
#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub password: String,
}

/// Successful unlock: the decrypted destination.
#[derive(Debug, Serialize)]
pub struct UnlockResponse {
    pub destination_url: String,
}
