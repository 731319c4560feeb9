//! Slug generation and validation utilities.
//!
//! Generated slugs are drawn from a cryptographically secure random source.
//! Uniqueness is NOT guaranteed here: the store's conditional create is the
//! single authority, and callers retry with a fresh slug on collision.

use crate::error::AppError;
use serde_json::json;

/// Alphabet for generated slugs: 62 alphanumeric symbols.
const SLUG_ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Shortest allowed generated slug.
pub const MIN_SLUG_LENGTH: usize = 6;

/// Longest allowed generated slug.
pub const MAX_SLUG_LENGTH: usize = 8;

/// Slugs reserved for service endpoints to prevent routing conflicts.
const RESERVED_SLUGS: &[&str] = &["go", "api", "links", "health", "admin", "static"];

/// Generates a random slug of `length` characters over [`SLUG_ALPHABET`].
///
/// Uses the OS random source via `getrandom`. Bytes of 248 and above are
/// rejected so the modulo reduction stays uniform over the 62-symbol alphabet.
///
/// `length` must be within `MIN_SLUG_LENGTH..=MAX_SLUG_LENGTH`; the value is
/// clamped rather than rejected since it comes from validated configuration.
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
pub fn generate_slug(length: usize) -> String {
    let length = length.clamp(MIN_SLUG_LENGTH, MAX_SLUG_LENGTH);
    let mut slug = String::with_capacity(length);
    let mut buffer = [0u8; 16];

    while slug.len() < length {
        getrandom::fill(&mut buffer).expect("OS random source failed");

        for &byte in &buffer {
            // 248 = 62 * 4: rejection threshold for unbiased sampling.
            if byte < 248 {
                slug.push(SLUG_ALPHABET[(byte % 62) as usize] as char);
                if slug.len() == length {
                    break;
                }
            }
        }
    }

    slug
}

/// Validates a user-provided custom slug.
///
/// # Rules
///
/// - Length: 4-32 characters
/// - Allowed characters: lowercase letters, digits, hyphens
/// - Cannot start or end with a hyphen
/// - Cannot shadow a reserved service path
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_slug(slug: &str) -> Result<(), AppError> {
    if slug.len() < 4 || slug.len() > 32 {
        return Err(AppError::bad_request(
            "Custom slug must be 4-32 characters",
            json!({ "provided_length": slug.len() }),
        ));
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(AppError::bad_request(
            "Custom slug can only contain lowercase letters, digits, and hyphens",
            json!({ "slug": slug }),
        ));
    }

    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(AppError::bad_request(
            "Custom slug cannot start or end with a hyphen",
            json!({ "slug": slug }),
        ));
    }

    if RESERVED_SLUGS.contains(&slug) {
        return Err(AppError::bad_request(
            "This slug is reserved",
            json!({ "slug": slug }),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_slug_has_requested_length() {
        for length in MIN_SLUG_LENGTH..=MAX_SLUG_LENGTH {
            assert_eq!(generate_slug(length).len(), length);
        }
    }

    #[test]
    fn test_generate_slug_clamps_out_of_range_lengths() {
        assert_eq!(generate_slug(1).len(), MIN_SLUG_LENGTH);
        assert_eq!(generate_slug(100).len(), MAX_SLUG_LENGTH);
    }

    #[test]
    fn test_generate_slug_alphanumeric_only() {
        let slug = generate_slug(8);
        assert!(slug.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_slug_produces_unique_values() {
        let mut seen = HashSet::new();

        for _ in 0..1000 {
            seen.insert(generate_slug(8));
        }

        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_generate_slug_covers_alphabet_classes() {
        // With 620 characters drawn, missing a whole class is astronomically
        // unlikely and would indicate broken sampling.
        let sample: String = (0..100).map(|_| generate_slug(MIN_SLUG_LENGTH)).collect();
        assert!(sample.chars().any(|c| c.is_ascii_uppercase()));
        assert!(sample.chars().any(|c| c.is_ascii_lowercase()));
        assert!(sample.chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_validate_accepts_simple_slug() {
        assert!(validate_custom_slug("my-link").is_ok());
        assert!(validate_custom_slug("promo2026").is_ok());
        assert!(validate_custom_slug("abcd").is_ok());
    }

    #[test]
    fn test_validate_rejects_too_short() {
        assert!(validate_custom_slug("abc").is_err());
        assert!(validate_custom_slug("").is_err());
    }

    #[test]
    fn test_validate_rejects_too_long() {
        let slug = "a".repeat(33);
        assert!(validate_custom_slug(&slug).is_err());
    }

    #[test]
    fn test_validate_rejects_uppercase() {
        assert!(validate_custom_slug("MyLink").is_err());
    }

    #[test]
    fn test_validate_rejects_special_characters() {
        assert!(validate_custom_slug("my_link").is_err());
        assert!(validate_custom_slug("my link").is_err());
        assert!(validate_custom_slug("my/link").is_err());
    }

    #[test]
    fn test_validate_rejects_edge_hyphens() {
        assert!(validate_custom_slug("-mylink").is_err());
        assert!(validate_custom_slug("mylink-").is_err());
        assert!(validate_custom_slug("my-link").is_ok());
    }

    #[test]
    fn test_validate_rejects_reserved_slugs() {
        for &reserved in RESERVED_SLUGS {
            assert!(
                validate_custom_slug(reserved).is_err(),
                "reserved slug '{}' should be rejected",
                reserved
            );
        }
    }
}
