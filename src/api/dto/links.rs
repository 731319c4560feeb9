//! DTOs for the authenticated link management endpoints.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::sync::LazyLock;
use validator::Validate;

/// Compiled regex for custom slug validation.
static CUSTOM_SLUG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());

/// Request to create a shortened link.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// The destination to shorten (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    /// Optional custom slug (lowercase alphanumeric and hyphens).
    #[validate(length(min = 4, max = 32))]
    #[validate(regex(path = "*CUSTOM_SLUG_REGEX"))]
    pub custom_slug: Option<String>,

    /// Optional password gating resolution.
    #[validate(length(min = 4, max = 128))]
    pub password: Option<String>,

    /// Optional absolute expiry.
    pub expires_at: Option<DateTime<Utc>>,

    /// Optional click ceiling.
    #[validate(range(min = 1))]
    pub max_clicks: Option<u64>,
}

/// Response for a created link.
#[derive(Debug, Serialize)]
pub struct CreateLinkResponse {
    pub slug: String,
    pub short_url: String,
    pub destination_url: String,
}

/// One of the owner's links, payload decrypted.
#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct LinkSummary {
    pub slug: String,
    pub short_url: String,
    pub destination_url: String,
    pub clicks: u64,
    pub created_at: DateTime<Utc>,
    pub password_protected: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<u64>,
}

/// Listing of the owner's links.
#[derive(Debug, Serialize)]
pub struct ListLinksResponse {
    pub total: usize,
    pub items: Vec<LinkSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str, custom_slug: Option<&str>) -> CreateLinkRequest {
        CreateLinkRequest {
            url: url.to_string(),
            custom_slug: custom_slug.map(str::to_string),
            password: None,
            expires_at: None,
            max_clicks: None,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(request("https://example.com", None).validate().is_ok());
        assert!(request("https://example.com", Some("my-slug")).validate().is_ok());
    }

    #[test]
    fn test_rejects_invalid_url() {
        assert!(request("not-a-url", None).validate().is_err());
    }

    #[test]
    fn test_rejects_bad_custom_slug() {
        assert!(request("https://example.com", Some("ab")).validate().is_err());
        assert!(request("https://example.com", Some("My_Slug")).validate().is_err());
    }

    #[test]
    fn test_rejects_zero_max_clicks() {
        let mut req = request("https://example.com", None);
        req.max_clicks = Some(0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_rejects_short_password() {
        let mut req = request("https://example.com", None);
        req.password = Some("abc".to_string());
        assert!(req.validate().is_err());
    }
}
