//! Error types for fieldseal.
//!
//! Every variant is a distinct failure mode of the cipher engine or the
//! field transform layer. Messages are intentionally minimal — they signal
//! *what* failed without revealing key material or plaintext fragments.

use std::fmt;

/// The single error type for all fieldseal operations.
#[derive(Debug)]
pub enum CipherError {
    /// The deployment-wide cipher seed is missing or non-numeric. Fatal at
    /// setup time: configuration must abort rather than continue with no
    /// encryption in place.
    InvalidSeed,

    /// The resolved key material is empty. Fatal at setup time.
    EmptySecret,

    /// A cipher primitive rejected the key material (wrong length, malformed).
    InvalidKey,

    /// The system's random number generator failed to produce bytes.
    RandomnessFailure,

    /// Encryption failed. The underlying cipher operation returned an error.
    EncryptionFailure,

    /// Ciphertext could not be decoded: bad base64, truncated payload,
    /// invalid block padding, or decrypted bytes that are not valid UTF-8.
    /// Recoverable — callers may propagate it or map the field to empty.
    DecodeFailure,

    /// Authenticated decryption detected tampering or a wrong key. This is
    /// a hard failure; the caller receives no partial plaintext.
    IntegrityFailure,

    /// An explicit per-field operation was requested for an entity that was
    /// never configured.
    UnknownEntity(String),
}

impl fmt::Display for CipherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSeed => write!(f, "cipher seed is missing or not numeric"),
            Self::EmptySecret => write!(f, "resolved secret is empty"),
            Self::InvalidKey => write!(f, "invalid key"),
            Self::RandomnessFailure => write!(f, "randomness source failed"),
            Self::EncryptionFailure => write!(f, "encryption failed"),
            Self::DecodeFailure => write!(f, "ciphertext could not be decoded"),
            Self::IntegrityFailure => write!(f, "integrity check failed"),
            Self::UnknownEntity(name) => write!(f, "no cipher config for entity: {}", name),
        }
    }
}

impl std::error::Error for CipherError {}
