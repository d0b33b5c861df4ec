//! The cipher engine: field value in, field value out.
//!
//! This is the contract the transform layer runs on. Both functions are
//! pure: no I/O, no shared state, deterministic given identical IV. The
//! ciphertext representation is standard base64 over the mode-specific
//! byte layout, so an encrypted value stores wherever its plaintext did.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::config::{CipherMode, EntityCipherConfig};
use crate::crypto;
use crate::error::CipherError;
use crate::keys;

/// Encrypt a single field value under the config's mode.
///
/// The empty-value rule lives in the transform layer, not here: this
/// function encrypts whatever it is given, including the empty string.
pub fn encrypt_value(value: &str, config: &EntityCipherConfig) -> Result<String, CipherError> {
    let sealed = match config.mode() {
        CipherMode::AuthCipher => {
            let key = keys::derive_working_key(config.key());
            crypto::seal_auth(&key, value.as_bytes())?
        }
        CipherMode::BlockCbc => {
            let key = keys::derive_working_key(config.key());
            crypto::seal_block(&key, value.as_bytes())?
        }
        CipherMode::BlockCbcLegacy => {
            let schedule = keys::derive_legacy_schedule(config.key());
            crypto::seal_block_legacy(&schedule.key, &schedule.iv, value.as_bytes())
        }
    };

    Ok(STANDARD.encode(sealed))
}

/// Decrypt a single field value under the config's mode.
///
/// Fails with [`CipherError::DecodeFailure`] on malformed input (bad
/// base64, truncated payload, bad padding, non-UTF-8 plaintext) and
/// [`CipherError::IntegrityFailure`] when auth mode detects tampering or
/// a wrong key. The block modes carry no integrity signal: a wrong key
/// there surfaces as a decode failure at best, garbage at worst.
pub fn decrypt_value(value: &str, config: &EntityCipherConfig) -> Result<String, CipherError> {
    let payload = STANDARD
        .decode(value)
        .map_err(|_| CipherError::DecodeFailure)?;

    let plaintext = match config.mode() {
        CipherMode::AuthCipher => {
            let key = keys::derive_working_key(config.key());
            crypto::open_auth(&key, &payload)?
        }
        CipherMode::BlockCbc => {
            let key = keys::derive_working_key(config.key());
            crypto::open_block(&key, &payload)?
        }
        CipherMode::BlockCbcLegacy => {
            let schedule = keys::derive_legacy_schedule(config.key());
            crypto::open_block_legacy(&schedule.key, &schedule.iv, &payload)?
        }
    };

    String::from_utf8(plaintext).map_err(|_| CipherError::DecodeFailure)
}
