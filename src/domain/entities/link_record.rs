//! Link record entity: the stored form of a shortened link.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// A shortened link as persisted at `links/{slug}`.
///
/// The destination URL never appears in plaintext: it lives inside
/// `encrypted_payload`, sealed under the owner's derived key with the stored
/// `iv` and `salt`. Policy fields (`expires_at`, `max_clicks`,
/// `password_protected`) are duplicated outside the ciphertext so the
/// resolution pipeline can gate access without decrypting first.
///
/// Field names serialize in camelCase to match the store's document layout.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    /// Unique key in the store. Immutable after creation.
    pub slug: String,
    /// Owning account id. Immutable after creation.
    pub owner_id: String,
    /// Base64 ciphertext of the [`LinkPayload`](super::LinkPayload).
    pub encrypted_payload: String,
    /// Base64 cipher nonce. Generated at creation, immutable.
    pub iv: String,
    /// Base64 per-record key salt. Generated at creation, immutable.
    pub salt: String,
    /// Whether a password gate guards resolution.
    #[serde(default)]
    pub password_protected: bool,
    /// Hex verification hash. Present iff `password_protected`.
    pub password_hash: Option<String>,
    /// Hex verification salt. Present iff `password_protected`.
    pub password_salt: Option<String>,
    /// Absolute expiry. The link is permanently unresolvable once passed.
    pub expires_at: Option<DateTime<Utc>>,
    /// Click ceiling. The link is permanently unresolvable once reached.
    pub max_clicks: Option<u64>,
    /// Monotonically non-decreasing. Mutated only by the resolution
    /// pipeline's click-recording step, via the store's atomic increment.
    #[serde(default)]
    pub click_count: u64,
    /// Soft-deletion flag.
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl LinkRecord {
    /// Returns true if the record has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|e| Utc::now() > e)
    }

    /// Returns true if the click ceiling has been reached.
    pub fn quota_exhausted(&self) -> bool {
        self.max_clicks.is_some_and(|max| self.click_count >= max)
    }
}

/// Per-user index entry at `users/{ownerId}/links/{slug}`.
///
/// Used for listing and deletion only; the [`LinkRecord`] is authoritative
/// for resolution. Written by the same caller that creates or deletes the
/// record.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIndexEntry {
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_record() -> LinkRecord {
        LinkRecord {
            slug: "Ab3xQ9".to_string(),
            owner_id: "user-1".to_string(),
            encrypted_payload: "Y2lwaGVydGV4dA==".to_string(),
            iv: "bm9uY2Vub25jZQ==".to_string(),
            salt: "c2FsdHNhbHQ=".to_string(),
            password_protected: false,
            password_hash: None,
            password_salt: None,
            expires_at: None,
            max_clicks: None,
            click_count: 0,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_fresh_record_is_resolvable() {
        let record = base_record();
        assert!(!record.is_expired());
        assert!(!record.quota_exhausted());
    }

    #[test]
    fn test_expired_record() {
        let record = LinkRecord {
            expires_at: Some(Utc::now() - Duration::seconds(1)),
            ..base_record()
        };
        assert!(record.is_expired());
    }

    #[test]
    fn test_future_expiry_not_expired() {
        let record = LinkRecord {
            expires_at: Some(Utc::now() + Duration::hours(1)),
            ..base_record()
        };
        assert!(!record.is_expired());
    }

    #[test]
    fn test_quota_exhausted_at_ceiling() {
        let record = LinkRecord {
            max_clicks: Some(5),
            click_count: 5,
            ..base_record()
        };
        assert!(record.quota_exhausted());
    }

    #[test]
    fn test_quota_not_exhausted_below_ceiling() {
        let record = LinkRecord {
            max_clicks: Some(5),
            click_count: 4,
            ..base_record()
        };
        assert!(!record.quota_exhausted());
    }

    #[test]
    fn test_no_ceiling_never_exhausts() {
        let record = LinkRecord {
            click_count: u64::MAX,
            ..base_record()
        };
        assert!(!record.quota_exhausted());
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(base_record()).unwrap();
        assert!(value.get("ownerId").is_some());
        assert!(value.get("encryptedPayload").is_some());
        assert!(value.get("clickCount").is_some());
        assert!(value.get("isActive").is_some());
        // Absent options are omitted entirely.
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("expiresAt").is_none());
    }

    #[test]
    fn test_deserializes_with_missing_defaults() {
        // Documents written before soft deletion existed have no isActive.
        let value = serde_json::json!({
            "slug": "abc123",
            "ownerId": "user-1",
            "encryptedPayload": "AA==",
            "iv": "AA==",
            "salt": "AA==",
            "createdAt": "2026-01-15T10:00:00Z",
        });

        let record: LinkRecord = serde_json::from_value(value).unwrap();
        assert!(record.is_active);
        assert_eq!(record.click_count, 0);
        assert!(!record.password_protected);
    }
}
