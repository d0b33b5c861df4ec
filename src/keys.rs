//! Key derivation and ownership.
//!
//! This module owns two responsibilities:
//! 1. Deriving working keys and IVs from the resolved shared secret.
//! 2. Holding secret material in types that are opaque, non-cloneable,
//!    and zeroised on drop.
//!
//! This is one of exactly two modules permitted to import cipher primitives
//! directly (the other is `crypto`). The digest logic lives here because it
//! operates on the key material itself — not on ciphertexts.
//!
//! ## Derivation structure
//!
//! ```text
//! auth / block modes:   working_key = SHA-256(secret)          (32 bytes)
//! legacy block mode:    working_key = MD5(secret)              (16 bytes)
//!                       iv          = MD5(MD5(secret))         (16 bytes)
//! ```
//!
//! The legacy schedule reproduces the historical scheme byte for byte: the
//! IV is a fixed function of the key and is reused for every encryption
//! under that key. The modern modes never use it — they draw a fresh random
//! IV or nonce per call in `crypto`.

use md5::{Digest, Md5};
use ring::digest;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{IV_LEN, KEY_LEN, LEGACY_KEY_LEN};

// ---------------------------------------------------------------------------
// Secret key
// ---------------------------------------------------------------------------

/// The shared secret resolved for one entity configuration.
///
/// - Not `Clone`. Cannot be duplicated without explicit conversion.
/// - Zeroised on drop. Memory is overwritten before deallocation.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: Vec<u8>,
}

impl SecretKey {
    /// Construct a `SecretKey` from resolved raw bytes.
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// True if no key material is present. An empty secret is a fatal
    /// configuration error, caught at resolution time.
    pub(crate) fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow the raw secret bytes for digest derivation.
    ///
    /// `pub(crate)` — raw bytes never leave the crate.
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derive the 256-bit working key used by the auth and block modes.
///
/// SHA-256 of the secret. One-way: the working key reveals nothing about
/// the secret, and secrets of any length map onto the fixed key size.
pub(crate) fn derive_working_key(secret: &SecretKey) -> [u8; KEY_LEN] {
    let digest = digest::digest(&digest::SHA256, secret.as_bytes());
    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(digest.as_ref());
    key
}

/// The fixed key/IV schedule of the legacy block mode.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct LegacySchedule {
    pub key: [u8; LEGACY_KEY_LEN],
    pub iv: [u8; IV_LEN],
}

/// Derive the legacy schedule: key = MD5(secret), IV = MD5(MD5(secret)).
///
/// MD5 survives here only for compatibility with ciphertext written under
/// the historical scheme. The modern modes derive through
/// [`derive_working_key`] instead.
pub(crate) fn derive_legacy_schedule(secret: &SecretKey) -> LegacySchedule {
    let key_digest = Md5::digest(secret.as_bytes());
    let iv_digest = Md5::digest(key_digest);
    LegacySchedule {
        key: key_digest.into(),
        iv: iv_digest.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_working_key_is_stable() {
        let secret = SecretKey::from_bytes(b"a shared secret".to_vec());
        assert_eq!(derive_working_key(&secret), derive_working_key(&secret));
    }

    #[test]
    fn test_legacy_schedule_differs_from_key() {
        // The IV is the double digest; it must never equal the key digest.
        let secret = SecretKey::from_bytes(b"a shared secret".to_vec());
        let schedule = derive_legacy_schedule(&secret);
        assert_ne!(schedule.key, schedule.iv);
    }

    #[test]
    fn test_different_secrets_different_keys() {
        let a = SecretKey::from_bytes(b"secret-a".to_vec());
        let b = SecretKey::from_bytes(b"secret-b".to_vec());
        assert_ne!(derive_working_key(&a), derive_working_key(&b));
    }
}
