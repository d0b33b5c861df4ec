//! Low-level cryptographic operations.
//!
//! This module is one of exactly two places in the crate that import cipher
//! primitives directly (the other is `keys`). All other modules perform
//! encryption and decryption exclusively through the functions exposed here.
//!
//! Primitive choices:
//! - **Auth mode**: AES-256-GCM (authenticated encryption) via `ring`,
//!   fresh 96-bit nonce per operation from `SystemRandom`
//! - **Block mode**: AES-256-CBC with PKCS#7 padding, fresh 128-bit IV per
//!   operation
//! - **Legacy block mode**: AES-128-CBC with zero padding and a fixed,
//!   caller-derived IV. Deterministic; kept only for compatibility with
//!   ciphertext written under the historical scheme.

use aes::{Aes128, Aes256};
use cbc::cipher::block_padding::{Pkcs7, ZeroPadding};
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use ring::aead::{self, Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::CipherError;

/// The AEAD algorithm behind auth mode.
const ALGORITHM: &aead::Algorithm = &AES_256_GCM;

/// Size of the AEAD nonce in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// Size of a working key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Size of a CBC initialization vector in bytes (one AES block).
pub const IV_LEN: usize = 16;

/// Size of the legacy working key in bytes (128 bits, one MD5 digest).
pub const LEGACY_KEY_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type LegacyCbcEnc = cbc::Encryptor<Aes128>;
type LegacyCbcDec = cbc::Decryptor<Aes128>;

/// Generate cryptographically secure random bytes.
///
/// Uses `ring::rand::SystemRandom` — the only source of randomness in the
/// crate. A fresh nonce or IV is generated for every encryption call; there
/// is no caching or counter-based generation.
fn random_bytes<const N: usize>() -> Result<[u8; N], CipherError> {
    let rng = SystemRandom::new();
    let mut buf = [0u8; N];
    rng.fill(&mut buf)
        .map_err(|_| CipherError::RandomnessFailure)?;
    Ok(buf)
}

/// Encrypt a plaintext payload using AES-256-GCM.
///
/// Returns the nonce prepended to the ciphertext. The caller does not need
/// to manage the nonce separately — it is bundled with the output and
/// extracted automatically during decryption.
///
/// # Layout of returned bytes
/// ```text
/// [ nonce (12 bytes) ][ ciphertext + GCM tag ]
/// ```
pub(crate) fn seal_auth(
    key_bytes: &[u8; KEY_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, CipherError> {
    let unbound = UnboundKey::new(ALGORITHM, key_bytes).map_err(|_| CipherError::InvalidKey)?;
    let key = LessSafeKey::new(unbound);

    let nonce_bytes = random_bytes::<NONCE_LEN>()?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| CipherError::EncryptionFailure)?;

    let mut output = Vec::with_capacity(NONCE_LEN + in_out.len());
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&in_out);
    Ok(output)
}

/// Decrypt an AES-256-GCM payload produced by [`seal_auth`].
///
/// If the key is wrong or the ciphertext has been tampered with, the GCM
/// authentication check fails and this returns [`CipherError::IntegrityFailure`].
/// The caller receives no partial plaintext.
pub(crate) fn open_auth(
    key_bytes: &[u8; KEY_LEN],
    payload: &[u8],
) -> Result<Vec<u8>, CipherError> {
    if payload.len() < NONCE_LEN + ALGORITHM.tag_len() {
        return Err(CipherError::DecodeFailure);
    }

    let nonce_bytes: [u8; NONCE_LEN] = payload[..NONCE_LEN]
        .try_into()
        .map_err(|_| CipherError::DecodeFailure)?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let unbound = UnboundKey::new(ALGORITHM, key_bytes).map_err(|_| CipherError::InvalidKey)?;
    let key = LessSafeKey::new(unbound);

    let mut in_out = payload[NONCE_LEN..].to_vec();
    let plaintext = key
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| CipherError::IntegrityFailure)?;

    Ok(plaintext.to_vec())
}

/// Encrypt a plaintext payload using AES-256-CBC with PKCS#7 padding.
///
/// A fresh random IV is generated per call and prepended, mirroring the
/// nonce layout of [`seal_auth`]:
/// ```text
/// [ iv (16 bytes) ][ ciphertext ]
/// ```
pub(crate) fn seal_block(
    key_bytes: &[u8; KEY_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, CipherError> {
    let iv = random_bytes::<IV_LEN>()?;
    let ciphertext =
        Aes256CbcEnc::new(key_bytes.into(), (&iv).into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut output = Vec::with_capacity(IV_LEN + ciphertext.len());
    output.extend_from_slice(&iv);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt an AES-256-CBC payload produced by [`seal_block`].
///
/// CBC carries no integrity signal: a wrong key surfaces as a padding
/// error here, or — rarely — as garbage plaintext that the engine layer
/// rejects when it fails UTF-8 decoding.
pub(crate) fn open_block(
    key_bytes: &[u8; KEY_LEN],
    payload: &[u8],
) -> Result<Vec<u8>, CipherError> {
    if payload.len() < IV_LEN {
        return Err(CipherError::DecodeFailure);
    }

    let (iv, ciphertext) = payload.split_at(IV_LEN);
    let iv: &[u8; IV_LEN] = iv.try_into().map_err(|_| CipherError::DecodeFailure)?;

    Aes256CbcDec::new(key_bytes.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherError::DecodeFailure)
}

/// Encrypt a plaintext payload under the legacy scheme: AES-128-CBC, zero
/// padding, fixed caller-derived IV.
///
/// Deterministic: identical plaintext and key produce identical output.
/// Identical plaintexts are therefore distinguishable in storage — the
/// historical weakness this mode exists to stay compatible with.
pub(crate) fn seal_block_legacy(
    key_bytes: &[u8; LEGACY_KEY_LEN],
    iv: &[u8; IV_LEN],
    plaintext: &[u8],
) -> Vec<u8> {
    LegacyCbcEnc::new(key_bytes.into(), iv.into()).encrypt_padded_vec_mut::<ZeroPadding>(plaintext)
}

/// Decrypt a legacy AES-128-CBC payload produced by [`seal_block_legacy`].
///
/// Trailing NUL bytes of the final block are stripped, stopping at the
/// first non-NUL byte from the end. A plaintext that genuinely ended in
/// NUL bytes loses them here — an ambiguity inherent to zero padding,
/// documented rather than fixed.
pub(crate) fn open_block_legacy(
    key_bytes: &[u8; LEGACY_KEY_LEN],
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CipherError> {
    if ciphertext.is_empty() {
        return Ok(Vec::new());
    }
    if ciphertext.len() % IV_LEN != 0 {
        return Err(CipherError::DecodeFailure);
    }

    LegacyCbcDec::new(key_bytes.into(), iv.into())
        .decrypt_padded_vec_mut::<ZeroPadding>(ciphertext)
        .map_err(|_| CipherError::DecodeFailure)
}
