//! The plaintext payload sealed inside every link record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Structured metadata encrypted into a record's `encrypted_payload`.
///
/// Policy fields are carried both here and on the record: the record copy
/// gates resolution before decryption, the sealed copy travels with the
/// destination and is what an owner reads back when listing links.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPayload {
    pub destination_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub password_protected: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<u64>,
    /// Caller-supplied metadata, preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
