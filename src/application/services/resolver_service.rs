//! Link resolution pipeline.
//!
//! Turns a slug into a destination URL, walking load → validate → gate →
//! decrypt → record-click:
//!
//! ```text
//! Initial ──slug──> Loading ──absent/inactive──> NotFound
//!                      │ ──past expiry──────────> Expired
//!                      │ ──quota reached────────> QuotaExceeded
//!                      │ ──password gate────────> PasswordRequired ⟲ retry
//!                      └──────────> Decrypting ──ok──> Resolved (+1 click)
//!                                        └──fail──> DecryptionFailed
//! ```
//!
//! `PasswordRequired` suspends as a [`PasswordGate`] value: the caller may
//! hold it indefinitely and submit attempts independently; failures leave the
//! gate usable. The click increment is issued only after a successful
//! decrypt, never before, so a failed decrypt consumes no click. Increment
//! failures after the fact are logged and do not block delivery.

use metrics::counter;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::crypto::codec;
use crate::crypto::keys::Keyring;
use crate::domain::entities::LinkRecord;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::store::StoreError;

/// Terminal failures of the resolution pipeline.
///
/// `InvalidPassword` is the one retryable kind: it reports a failed attempt
/// while the pipeline stays suspended at the password gate.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("short link not found")]
    NotFound,

    #[error("short link has expired")]
    Expired,

    #[error("short link has reached its click limit")]
    QuotaExceeded,

    #[error("invalid link password")]
    InvalidPassword,

    /// Opaque: wrong key, corrupted ciphertext, and malformed payloads are
    /// indistinguishable to the caller.
    #[error("short link could not be decrypted")]
    Decryption,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A successfully resolved link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub destination_url: String,
}

/// Result of driving the pipeline as far as it goes without caller input.
pub enum ResolveOutcome<R: LinkRepository> {
    Resolved(Resolved),
    /// Suspended awaiting a password. Submit attempts via
    /// [`PasswordGate::submit`].
    PasswordRequired(PasswordGate<R>),
}

/// The pipeline suspended at its password gate.
///
/// Each `submit` is an independent attempt: a mismatch returns
/// [`ResolveError::InvalidPassword`] and leaves the gate ready for the next
/// try. No click is recorded until an attempt passes the gate and the
/// payload decrypts.
pub struct PasswordGate<R: LinkRepository> {
    record: LinkRecord,
    records: Arc<R>,
    keyring: Keyring,
}

impl<R: LinkRepository> PasswordGate<R> {
    /// The slug this gate belongs to.
    pub fn slug(&self) -> &str {
        &self.record.slug
    }

    /// Verifies one password attempt and, on success, finishes the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidPassword`] on a mismatch (retryable)
    /// and [`ResolveError::Decryption`] if the payload will not decrypt.
    pub async fn submit(&self, password: &str) -> Result<Resolved, ResolveError> {
        // A protected record without material is malformed; stay opaque.
        let (Some(hash), Some(salt)) = (&self.record.password_hash, &self.record.password_salt)
        else {
            return Err(ResolveError::Decryption);
        };

        if !crate::crypto::keys::verify_password(password, hash, salt) {
            debug!(slug = %self.record.slug, "password attempt rejected");
            note_outcome("invalid_password");
            return Err(ResolveError::InvalidPassword);
        }

        finish(self.records.as_ref(), &self.keyring, &self.record).await
    }
}

/// Orchestrates link resolution over the record repository.
pub struct ResolverService<R: LinkRepository> {
    records: Arc<R>,
    keyring: Keyring,
}

impl<R: LinkRepository> ResolverService<R> {
    /// Creates a resolver over a record repository and the server keyring.
    pub fn new(records: Arc<R>, keyring: Keyring) -> Self {
        Self { records, keyring }
    }

    /// Drives the pipeline for `slug` as far as it can go.
    ///
    /// Returns [`ResolveOutcome::Resolved`] with the destination for open
    /// links (the click is already recorded at that point), or
    /// [`ResolveOutcome::PasswordRequired`] for gated ones.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::NotFound`] - empty slug, absent record, or
    ///   soft-deleted record
    /// - [`ResolveError::Expired`] / [`ResolveError::QuotaExceeded`] -
    ///   policy checks, evaluated in that order before any password gate
    /// - [`ResolveError::Decryption`] - payload failure, opaque
    /// - [`ResolveError::Store`] - transport failure, caller may retry
    pub async fn resolve(&self, slug: &str) -> Result<ResolveOutcome<R>, ResolveError> {
        if slug.trim().is_empty() {
            warn!("resolution requested without a slug");
            note_outcome("not_found");
            return Err(ResolveError::NotFound);
        }

        debug!(slug, "loading link record");
        let record = match self.records.get(slug).await? {
            Some(record) if record.is_active => record,
            _ => {
                note_outcome("not_found");
                return Err(ResolveError::NotFound);
            }
        };

        if record.is_expired() {
            debug!(slug, "link is past its expiry");
            note_outcome("expired");
            return Err(ResolveError::Expired);
        }

        if record.quota_exhausted() {
            debug!(slug, clicks = record.click_count, "link click quota reached");
            note_outcome("quota_exceeded");
            return Err(ResolveError::QuotaExceeded);
        }

        if record.password_protected {
            debug!(slug, "link is password protected, awaiting input");
            note_outcome("password_required");
            return Ok(ResolveOutcome::PasswordRequired(PasswordGate {
                record,
                records: self.records.clone(),
                keyring: self.keyring.clone(),
            }));
        }

        let resolved = finish(self.records.as_ref(), &self.keyring, &record).await?;
        Ok(ResolveOutcome::Resolved(resolved))
    }
}

/// Decrypts the payload and records the click.
///
/// Ordering matters: the increment runs only after decryption succeeded, and
/// an increment failure is reported but never withholds the destination —
/// click accounting is best-effort, resolution correctness is not.
async fn finish<R: LinkRepository>(
    records: &R,
    keyring: &Keyring,
    record: &LinkRecord,
) -> Result<Resolved, ResolveError> {
    let key = keyring.user_key(&record.owner_id).map_err(|e| {
        warn!(slug = %record.slug, error = %e, "key derivation failed for stored record");
        note_outcome("decryption_failed");
        ResolveError::Decryption
    })?;

    let payload = codec::decrypt(&record.encrypted_payload, &key, &record.iv, &record.salt)
        .map_err(|_| {
            note_outcome("decryption_failed");
            ResolveError::Decryption
        })?;

    match records.increment_clicks(&record.slug).await {
        Ok(count) => debug!(slug = %record.slug, count, "click recorded"),
        Err(e) => {
            warn!(slug = %record.slug, error = %e, "click increment failed after resolution");
            counter!("linkvault_click_record_failures_total").increment(1);
        }
    }

    note_outcome("resolved");
    Ok(Resolved {
        destination_url: payload.destination_url,
    })
}

fn note_outcome(outcome: &'static str) {
    counter!("linkvault_resolutions_total", "outcome" => outcome).increment(1);
}
