//! Entity configuration and resolution.
//!
//! A `RawEntityConfig` is what the caller's settings layer hands over; an
//! `EntityCipherConfig` is the resolved, immutable form the engine runs on.
//! Resolution happens exactly once, at setup time. Every failure here is
//! fatal to setup: the process must not run with encryption silently
//! disabled or misconfigured.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CipherError;
use crate::keys::SecretKey;

/// Block-mode keys only use the leading bytes of the deployment salt.
/// Longer salts are truncated before derivation; explicit keys are not.
const BLOCK_KEY_SIGNIFICANT_BYTES: usize = 24;

/// Process-wide inputs, injected by the caller at startup.
///
/// Nothing in this crate reads ambient global state — the deployment salt,
/// the seed guard, and the runtime's block-cipher capability all arrive
/// through this struct.
pub struct Environment {
    /// The deployment-wide security salt. Source of all key material when
    /// an entity does not specify its own key.
    pub secret: String,
    /// Numeric guard value. Its presence and shape are validated at setup;
    /// it is never used as cryptographic material.
    pub cipher_seed: String,
    /// Whether the runtime provides the block-cipher construction. Drives
    /// `auto` mode resolution; never probed implicitly.
    pub block_cipher_available: bool,
}

/// A requested cipher mode, before resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeRequest {
    /// Resolve to `BlockCbc` when the runtime provides the block cipher,
    /// otherwise fall back to `AuthCipher`.
    #[default]
    Auto,
    /// Authenticated encryption (AES-256-GCM).
    Auth,
    /// AES-256-CBC with a random per-call IV.
    BlockCbc,
    /// The historical fixed-IV construction. Compatibility only.
    BlockCbcLegacy,
}

/// A concrete cipher mode. `auto` does not exist at this level — requests
/// resolve to exactly one variant before a config is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CipherMode {
    AuthCipher,
    BlockCbc,
    BlockCbcLegacy,
}

/// Caller-supplied per-entity settings. All fields optional; defaults are
/// no fields, auto-decrypt on, salt-derived key, `auto` mode.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEntityConfig {
    /// Names of the fields to encrypt on write and decrypt on read.
    pub fields: Vec<String>,
    /// Decrypt automatically on primary reads. Defaults to true.
    pub auto_decrypt: Option<bool>,
    /// Entity-specific key. When absent, the key resolves from the
    /// deployment salt.
    pub key: Option<String>,
    /// Requested cipher mode.
    pub cipher: ModeRequest,
}

/// Resolved, immutable per-entity configuration.
///
/// Constructed once when the feature is attached to an entity type; safe
/// to share across concurrent readers thereafter.
pub struct EntityCipherConfig {
    fields: HashSet<String>,
    auto_decrypt: bool,
    key: SecretKey,
    mode: CipherMode,
}

impl EntityCipherConfig {
    /// Resolve a raw config against the environment.
    ///
    /// Resolution order:
    /// 1. Validate the cipher seed (present, numeric). `InvalidSeed` aborts.
    /// 2. Resolve the mode: explicit request wins; `auto` follows the
    ///    injected capability flag.
    /// 3. Resolve the key: explicit key > truncated salt (block modes) >
    ///    whole salt. An empty result is `EmptySecret`.
    pub fn resolve(raw: RawEntityConfig, env: &Environment) -> Result<Self, CipherError> {
        if !seed_validates(&env.cipher_seed) {
            return Err(CipherError::InvalidSeed);
        }

        let mode = match raw.cipher {
            ModeRequest::Auto => {
                if env.block_cipher_available {
                    CipherMode::BlockCbc
                } else {
                    CipherMode::AuthCipher
                }
            }
            ModeRequest::Auth => CipherMode::AuthCipher,
            ModeRequest::BlockCbc => CipherMode::BlockCbc,
            ModeRequest::BlockCbcLegacy => CipherMode::BlockCbcLegacy,
        };

        let key_bytes = match raw.key {
            Some(key) => key.into_bytes(),
            None => match mode {
                // Only the leading salt bytes are significant to the block
                // modes; the schedule digests them either way.
                CipherMode::BlockCbc | CipherMode::BlockCbcLegacy => {
                    let salt = env.secret.as_bytes();
                    salt[..salt.len().min(BLOCK_KEY_SIGNIFICANT_BYTES)].to_vec()
                }
                CipherMode::AuthCipher => env.secret.clone().into_bytes(),
            },
        };

        let key = SecretKey::from_bytes(key_bytes);
        if key.is_empty() {
            return Err(CipherError::EmptySecret);
        }

        Ok(Self {
            fields: raw.fields.into_iter().collect(),
            auto_decrypt: raw.auto_decrypt.unwrap_or(true),
            key,
            mode,
        })
    }

    /// The set of field names this entity encrypts.
    pub fn fields(&self) -> &HashSet<String> {
        &self.fields
    }

    /// Whether primary reads decrypt automatically.
    pub fn auto_decrypt(&self) -> bool {
        self.auto_decrypt
    }

    /// The resolved cipher mode.
    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    pub(crate) fn key(&self) -> &SecretKey {
        &self.key
    }
}

impl fmt::Debug for EntityCipherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Key material is deliberately absent.
        f.debug_struct("EntityCipherConfig")
            .field("fields", &self.fields)
            .field("auto_decrypt", &self.auto_decrypt)
            .field("mode", &self.mode)
            .finish()
    }
}

/// The seed is a guard, not key material: it must be present and look like
/// a number. Anything else means the deployment never set up its secrets.
fn seed_validates(seed: &str) -> bool {
    !seed.is_empty() && seed.bytes().all(|b| b.is_ascii_digit())
}
