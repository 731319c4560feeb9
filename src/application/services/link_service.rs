//! Link creation, listing, and deletion.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::crypto::codec;
use crate::crypto::keys::{self, Keyring};
use crate::domain::entities::{LinkPayload, LinkRecord, UserIndexEntry};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::slug_generator::{generate_slug, validate_custom_slug};
use crate::utils::url_normalizer::normalize_url;

/// Attempts at generating a fresh slug before giving up on collisions.
const MAX_SLUG_ATTEMPTS: usize = 10;

/// Input for creating a new link.
#[derive(Debug, Clone, Default)]
pub struct NewLinkSpec {
    pub destination_url: String,
    pub custom_slug: Option<String>,
    pub password: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<u64>,
}

/// A freshly created link.
#[derive(Debug, Clone)]
pub struct CreatedLink {
    pub slug: String,
    pub short_url: String,
    pub destination_url: String,
}

/// An owner's link with its payload decrypted, as returned by listings.
#[derive(Debug, Clone)]
pub struct OwnedLink {
    pub slug: String,
    pub short_url: String,
    pub destination_url: String,
    pub clicks: u64,
    pub created_at: DateTime<Utc>,
    pub password_protected: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<u64>,
}

/// Service for creating and managing shortened links.
///
/// Destinations never reach the store in plaintext: each record's payload is
/// sealed under the owner's derived key before the write. Slug reservation
/// rides on the repository's conditional create, retried with fresh random
/// slugs on collision.
pub struct LinkService<R: LinkRepository> {
    records: Arc<R>,
    keyring: Keyring,
    base_url: String,
    slug_length: usize,
}

impl<R: LinkRepository> LinkService<R> {
    /// Creates a link service.
    ///
    /// `base_url` is the public origin short URLs are built from;
    /// `slug_length` the generated slug length (6-8, from validated config).
    pub fn new(records: Arc<R>, keyring: Keyring, base_url: String, slug_length: usize) -> Self {
        Self {
            records,
            keyring,
            base_url,
            slug_length,
        }
    }

    /// Builds the public short URL for a slug.
    pub fn short_url(&self, slug: &str) -> String {
        format!("{}/go?slug={}", self.base_url.trim_end_matches('/'), slug)
    }

    /// Creates a shortened link owned by `owner_id`.
    ///
    /// The destination is normalized, the payload encrypted under the
    /// owner's derived key, and the slug reserved via conditional create.
    /// Collisions on generated slugs retry with a fresh slug up to
    /// [`MAX_SLUG_ATTEMPTS`] times; a taken custom slug is a terminal
    /// conflict.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a bad destination, custom slug,
    /// or zero click ceiling; [`AppError::Conflict`] when a custom slug is
    /// taken; [`AppError::Unavailable`] on store failures.
    pub async fn create_link(
        &self,
        owner_id: &str,
        spec: NewLinkSpec,
    ) -> Result<CreatedLink, AppError> {
        let destination = normalize_url(&spec.destination_url).map_err(|e| {
            AppError::bad_request("Invalid destination URL", json!({ "reason": e.to_string() }))
        })?;

        if spec.max_clicks == Some(0) {
            return Err(AppError::bad_request(
                "Click limit must be at least 1",
                json!({ "max_clicks": 0 }),
            ));
        }

        let key = self
            .keyring
            .user_key(owner_id)
            .map_err(|e| AppError::internal("Key derivation failed", json!({ "reason": e.to_string() })))?;

        let now = Utc::now();
        let payload = LinkPayload {
            destination_url: destination.clone(),
            created_at: now,
            password_protected: spec.password.is_some(),
            expires_at: spec.expires_at,
            max_clicks: spec.max_clicks,
            extra: serde_json::Map::new(),
        };

        let sealed = codec::encrypt(&payload, &key)
            .map_err(|e| AppError::internal("Failed to encrypt payload", json!({ "reason": e.to_string() })))?;

        let password_material = spec.password.as_deref().map(keys::hash_password);

        let build_record = |slug: String| LinkRecord {
            slug,
            owner_id: owner_id.to_string(),
            encrypted_payload: sealed.ciphertext.clone(),
            iv: sealed.iv.clone(),
            salt: sealed.salt.clone(),
            password_protected: password_material.is_some(),
            password_hash: password_material.as_ref().map(|m| m.hash.clone()),
            password_salt: password_material.as_ref().map(|m| m.salt.clone()),
            expires_at: spec.expires_at,
            max_clicks: spec.max_clicks,
            click_count: 0,
            is_active: true,
            created_at: now,
        };

        let slug = if let Some(custom) = spec.custom_slug {
            validate_custom_slug(&custom)?;

            if !self.records.create(&build_record(custom.clone())).await? {
                return Err(AppError::conflict(
                    "This custom slug is already taken",
                    json!({ "slug": custom }),
                ));
            }
            custom
        } else {
            self.reserve_generated_slug(&build_record).await?
        };

        let entry = UserIndexEntry {
            created_at: now,
            is_active: true,
        };
        self.records.put_index_entry(owner_id, &slug, &entry).await?;

        info!(%slug, owner_id, "link created");

        Ok(CreatedLink {
            short_url: self.short_url(&slug),
            slug,
            destination_url: destination,
        })
    }

    /// Lists the owner's links with their payloads decrypted.
    ///
    /// Records that vanished under the index, belong to someone else, or no
    /// longer decrypt are skipped with a warning rather than failing the
    /// whole listing.
    pub async fn list_links(&self, owner_id: &str) -> Result<Vec<OwnedLink>, AppError> {
        let key = self
            .keyring
            .user_key(owner_id)
            .map_err(|e| AppError::internal("Key derivation failed", json!({ "reason": e.to_string() })))?;

        let slugs = self.records.list_owned_slugs(owner_id).await?;
        let mut links = Vec::with_capacity(slugs.len());

        for slug in slugs {
            let Some(record) = self.records.get(&slug).await? else {
                warn!(%slug, "index entry points at a missing record");
                continue;
            };
            if record.owner_id != owner_id || !record.is_active {
                continue;
            }

            let payload =
                match codec::decrypt(&record.encrypted_payload, &key, &record.iv, &record.salt) {
                    Ok(payload) => payload,
                    Err(_) => {
                        warn!(%slug, "skipping link that no longer decrypts");
                        continue;
                    }
                };

            links.push(OwnedLink {
                short_url: self.short_url(&record.slug),
                slug: record.slug,
                destination_url: payload.destination_url,
                clicks: record.click_count,
                created_at: record.created_at,
                password_protected: record.password_protected,
                expires_at: record.expires_at,
                max_clicks: record.max_clicks,
            });
        }

        Ok(links)
    }

    /// Deletes an owned link: the record and the index entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown slug and
    /// [`AppError::Forbidden`] when the caller does not own it.
    pub async fn delete_link(&self, owner_id: &str, slug: &str) -> Result<(), AppError> {
        let record = self
            .records
            .get(slug)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "slug": slug })))?;

        if record.owner_id != owner_id {
            return Err(AppError::forbidden(
                "You do not own this link",
                json!({ "slug": slug }),
            ));
        }

        self.records.remove(slug).await?;
        self.records.remove_index_entry(owner_id, slug).await?;

        info!(slug, owner_id, "link deleted");
        Ok(())
    }

    /// Reserves a generated slug, retrying on collision.
    async fn reserve_generated_slug(
        &self,
        build_record: &(dyn Fn(String) -> LinkRecord + Send + Sync),
    ) -> Result<String, AppError> {
        for _ in 0..MAX_SLUG_ATTEMPTS {
            let slug = generate_slug(self.slug_length);
            if self.records.create(&build_record(slug.clone())).await? {
                return Ok(slug);
            }
            warn!(%slug, "generated slug collided, retrying");
        }

        Err(AppError::internal(
            "Failed to reserve a unique slug",
            json!({ "reason": "too many collisions" }),
        ))
    }
}
