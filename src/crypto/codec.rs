//! Authenticated encryption of link payloads.
//!
//! A [`LinkPayload`](crate::domain::entities::LinkPayload) is serialized to
//! JSON and sealed under AES-256-GCM. Each record carries a fresh random
//! `salt` and `iv`: the salt is mixed with the owner's derived key into a
//! per-record cipher key, the iv is the GCM nonce. Everything is stored
//! base64-encoded so the record stays a plain JSON document.
//!
//! Decryption failures are deliberately opaque: a wrong key, a corrupted
//! ciphertext, and a malformed plaintext all surface as the same
//! [`CodecError::Decrypt`], so a caller probing slugs cannot learn which
//! sub-check failed.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::crypto::keys::DerivedKey;
use crate::domain::entities::LinkPayload;

type HmacSha256 = Hmac<Sha256>;

/// Byte length of the per-record key salt.
const RECORD_SALT_LEN: usize = 16;

/// Byte length of the AES-GCM nonce.
const NONCE_LEN: usize = 12;

/// Errors from payload encryption and decryption.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("payload could not be encoded: {0}")]
    Encode(String),

    /// Opaque by design. Covers wrong key, corrupted ciphertext, and
    /// malformed plaintext alike.
    #[error("payload could not be decrypted")]
    Decrypt,
}

/// Ciphertext plus the parameters required to decrypt it, base64-encoded.
#[derive(Debug, Clone)]
pub struct SealedPayload {
    pub ciphertext: String,
    pub iv: String,
    pub salt: String,
}

/// Derives the per-record cipher key: HMAC-SHA256 of the record salt under
/// the owner key. Distinct salts give distinct cipher keys for one owner.
fn record_key(key: &DerivedKey, salt: &[u8]) -> [u8; 32] {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(salt);
    mac.finalize().into_bytes().into()
}

/// Encrypts a payload under the owner's derived key.
///
/// Draws a fresh salt and nonce per call, so encrypting the same payload
/// twice yields unrelated ciphertexts.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if the payload fails JSON serialization.
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
pub fn encrypt(payload: &LinkPayload, key: &DerivedKey) -> Result<SealedPayload, CodecError> {
    let plaintext =
        serde_json::to_vec(payload).map_err(|e| CodecError::Encode(e.to_string()))?;

    let mut salt = [0u8; RECORD_SALT_LEN];
    getrandom::fill(&mut salt).expect("OS random source failed");
    let mut nonce = [0u8; NONCE_LEN];
    getrandom::fill(&mut nonce).expect("OS random source failed");

    let cipher_key = record_key(key, &salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&cipher_key));

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_ref())
        .map_err(|_| CodecError::Encode("cipher rejected the payload".to_string()))?;

    Ok(SealedPayload {
        ciphertext: BASE64.encode(ciphertext),
        iv: BASE64.encode(nonce),
        salt: BASE64.encode(salt),
    })
}

/// Decrypts a stored payload.
///
/// # Errors
///
/// Returns the opaque [`CodecError::Decrypt`] when the key is wrong, any of
/// the base64 parameters fail to decode, the GCM tag does not verify, or the
/// decrypted bytes are not a valid payload. Never returns partially-parsed
/// data.
pub fn decrypt(
    ciphertext: &str,
    key: &DerivedKey,
    iv: &str,
    salt: &str,
) -> Result<LinkPayload, CodecError> {
    let ciphertext = BASE64.decode(ciphertext).map_err(|_| CodecError::Decrypt)?;
    let nonce = BASE64.decode(iv).map_err(|_| CodecError::Decrypt)?;
    let salt = BASE64.decode(salt).map_err(|_| CodecError::Decrypt)?;

    if nonce.len() != NONCE_LEN {
        return Err(CodecError::Decrypt);
    }

    let cipher_key = record_key(key, &salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&cipher_key));

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce), ciphertext.as_ref())
        .map_err(|_| CodecError::Decrypt)?;

    serde_json::from_slice(&plaintext).map_err(|_| CodecError::Decrypt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::Keyring;
    use chrono::Utc;

    fn test_key(owner: &str) -> DerivedKey {
        Keyring::new("codec-test-secret").user_key(owner).unwrap()
    }

    fn sample_payload() -> LinkPayload {
        LinkPayload {
            destination_url: "https://example.com/some/page?q=1".to_string(),
            created_at: Utc::now(),
            password_protected: false,
            expires_at: None,
            max_clicks: Some(10),
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_roundtrip_restores_payload() {
        let key = test_key("user-1");
        let payload = sample_payload();

        let sealed = encrypt(&payload, &key).unwrap();
        let restored = decrypt(&sealed.ciphertext, &key, &sealed.iv, &sealed.salt).unwrap();

        assert_eq!(restored, payload);
    }

    #[test]
    fn test_wrong_key_fails_opaquely() {
        let payload = sample_payload();
        let sealed = encrypt(&payload, &test_key("user-1")).unwrap();

        let result = decrypt(&sealed.ciphertext, &test_key("user-2"), &sealed.iv, &sealed.salt);

        assert!(matches!(result, Err(CodecError::Decrypt)));
    }

    #[test]
    fn test_corrupted_ciphertext_fails() {
        let key = test_key("user-1");
        let sealed = encrypt(&sample_payload(), &key).unwrap();

        let mut bytes = BASE64.decode(&sealed.ciphertext).unwrap();
        bytes[0] ^= 0xff;
        let corrupted = BASE64.encode(bytes);

        let result = decrypt(&corrupted, &key, &sealed.iv, &sealed.salt);
        assert!(matches!(result, Err(CodecError::Decrypt)));
    }

    #[test]
    fn test_wrong_salt_fails() {
        let key = test_key("user-1");
        let sealed = encrypt(&sample_payload(), &key).unwrap();
        let other = encrypt(&sample_payload(), &key).unwrap();

        let result = decrypt(&sealed.ciphertext, &key, &sealed.iv, &other.salt);
        assert!(matches!(result, Err(CodecError::Decrypt)));
    }

    #[test]
    fn test_invalid_base64_fails() {
        let key = test_key("user-1");
        let result = decrypt("%%%not-base64%%%", &key, "also bad", "nope");
        assert!(matches!(result, Err(CodecError::Decrypt)));
    }

    #[test]
    fn test_fresh_parameters_per_call() {
        let key = test_key("user-1");
        let payload = sample_payload();

        let a = encrypt(&payload, &key).unwrap();
        let b = encrypt(&payload, &key).unwrap();

        assert_ne!(a.ciphertext, b.ciphertext);
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.salt, b.salt);
    }

    #[test]
    fn test_extra_metadata_survives_roundtrip() {
        let key = test_key("user-1");
        let mut payload = sample_payload();
        payload
            .extra
            .insert("campaign".to_string(), serde_json::json!("spring-launch"));

        let sealed = encrypt(&payload, &key).unwrap();
        let restored = decrypt(&sealed.ciphertext, &key, &sealed.iv, &sealed.salt).unwrap();

        assert_eq!(restored.extra["campaign"], "spring-launch");
    }
}
