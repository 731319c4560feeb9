//! Secret derivation for link encryption and password gates.
//!
//! Two independent derivations live here:
//!
//! - **User keys** ([`Keyring::user_key`]) - deterministic 256-bit symmetric
//!   keys computed from `(owner_id, server secret)`. Recomputed on demand,
//!   held in memory only, never persisted.
//! - **Link passwords** ([`hash_password`] / [`verify_password`]) - salted
//!   verification material stored on the record for password-gated links.

use pbkdf2::pbkdf2_hmac;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// PBKDF2 iteration count for user key derivation.
const KEY_ITERATIONS: u32 = 10_000;

/// PBKDF2 iteration count for link password hashing.
const PASSWORD_ITERATIONS: u32 = 1_000;

/// Fixed installation salt component mixed into every user-key salt.
const INSTALL_SALT: &str = "linkvault/key-salt/v1";

/// Byte length of random password salts.
const PASSWORD_SALT_LEN: usize = 16;

/// Errors from key derivation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("owner id must not be empty")]
    EmptyOwnerId,

    #[error("key secret must not be empty")]
    EmptySecret,
}

/// A derived 256-bit symmetric key. Never serialized, never logged.
#[derive(Clone, PartialEq)]
pub struct DerivedKey([u8; 32]);

impl DerivedKey {
    /// Raw key bytes for cipher construction.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

/// Holds the server-side key secret and derives per-owner keys on demand.
///
/// The secret comes from configuration (`LINK_KEY_SECRET`) and must not be
/// derivable from any public identifier: with it absent from the picture,
/// knowing an `owner_id` alone never yields the owner's key.
#[derive(Clone)]
pub struct Keyring {
    secret: String,
}

impl Keyring {
    /// Creates a keyring around the server key secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Derives the symmetric key for `owner_id`.
    ///
    /// Deterministic: the same `(owner_id, secret)` pair always yields the
    /// same key. The KDF salt is `SHA-256(installation salt || owner_id)`,
    /// so distinct owners derive distinct keys under one secret.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::EmptyOwnerId`] for an empty owner id (an empty id
    /// would collapse all anonymous salts into one) and
    /// [`KeyError::EmptySecret`] if the keyring was built with no secret.
    pub fn user_key(&self, owner_id: &str) -> Result<DerivedKey, KeyError> {
        if owner_id.is_empty() {
            return Err(KeyError::EmptyOwnerId);
        }
        if self.secret.is_empty() {
            return Err(KeyError::EmptySecret);
        }

        let mut hasher = Sha256::new();
        hasher.update(INSTALL_SALT.as_bytes());
        hasher.update(owner_id.as_bytes());
        let salt = hasher.finalize();

        let mut key = [0u8; 32];
        pbkdf2_hmac::<Sha256>(self.secret.as_bytes(), &salt, KEY_ITERATIONS, &mut key);

        Ok(DerivedKey(key))
    }
}

/// Verification material for a password-gated link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordMaterial {
    /// Hex-encoded PBKDF2 output.
    pub hash: String,
    /// Hex-encoded random salt.
    pub salt: String,
}

/// Hashes a link password with a fresh random salt.
///
/// Non-deterministic: every call draws a new salt, so this runs only at link
/// creation time. Verification re-derives with the stored salt.
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
pub fn hash_password(password: &str) -> PasswordMaterial {
    let mut salt = [0u8; PASSWORD_SALT_LEN];
    getrandom::fill(&mut salt).expect("OS random source failed");

    let mut hash = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PASSWORD_ITERATIONS, &mut hash);

    PasswordMaterial {
        hash: hex::encode(hash),
        salt: hex::encode(salt),
    }
}

/// Verifies a password attempt against stored material.
///
/// The comparison is constant-time over the full digest; a mismatch in the
/// first byte costs the same as a mismatch in the last. Undecodable stored
/// material verifies as `false` rather than erroring.
pub fn verify_password(password: &str, hash: &str, salt: &str) -> bool {
    let Ok(salt_bytes) = hex::decode(salt) else {
        return false;
    };
    let Ok(expected) = hex::decode(hash) else {
        return false;
    };
    if expected.len() != 32 {
        return false;
    }

    let mut candidate = [0u8; 32];
    pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        &salt_bytes,
        PASSWORD_ITERATIONS,
        &mut candidate,
    );

    bool::from(candidate.ct_eq(expected.as_slice()))
}
