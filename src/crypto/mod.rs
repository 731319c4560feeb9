//! Cryptographic primitives: secret derivation and the link payload codec.
//!
//! - [`keys`] - per-owner key derivation and link password hashing
//! - [`codec`] - authenticated encryption of link payloads

pub mod codec;
pub mod keys;

pub use codec::{CodecError, SealedPayload};
pub use keys::{DerivedKey, KeyError, Keyring, PasswordMaterial};
