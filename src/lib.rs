//! # fieldseal
//!
//! Transparent field-level encryption for persistence layers.
//!
//! A configured subset of a record's fields is encrypted immediately before
//! the record is written to storage and decrypted immediately after it is
//! read back. Application code sees plaintext; storage sees base64
//! ciphertext; nothing else about the record's shape changes.
//!
//! Three cipher modes are supported: authenticated encryption
//! (AES-256-GCM), CBC with a random per-call IV (AES-256-CBC), and a
//! deterministic fixed-IV CBC shim kept for compatibility with ciphertext
//! written under the historical scheme. Mode, field list, key and
//! auto-decrypt policy are resolved per entity at setup time and are
//! immutable afterwards.
//!
//! ## Public API
//!
//! The public surface of this crate is intentionally narrow. Callers hold
//! a [`FieldCipher`], configure it once per entity type, and route records
//! through [`FieldCipher::before_write`] and [`FieldCipher::after_read`].
//! Per-value entry points exist for entities configured with auto-decrypt
//! off.

// Module declarations.
pub mod config;
pub(crate) mod crypto;
pub mod engine;
pub mod error;
pub(crate) mod keys;

use std::collections::HashMap;

use config::{EntityCipherConfig, Environment, RawEntityConfig};
use error::CipherError;

// ---------------------------------------------------------------------------
// Record shapes
// ---------------------------------------------------------------------------

/// A mapping from field name to stored value.
pub type FieldMap = HashMap<String, String>;

/// The nested record shape produced by the surrounding framework:
/// entity name → field map. Records are transient; the cipher receives one
/// by value and relinquishes the transformed copy back to the caller.
pub type Record = HashMap<String, FieldMap>;

// ---------------------------------------------------------------------------
// Facade
// ---------------------------------------------------------------------------

/// The field transform orchestrator.
///
/// Owns the injected [`Environment`] and the registry of resolved per-entity
/// configs. Configuration is `&mut self` and happens once per entity at
/// setup; every transform is `&self`, so a fully-configured `FieldCipher`
/// can be shared freely across request handlers.
pub struct FieldCipher {
    env: Environment,
    configs: HashMap<String, EntityCipherConfig>,
}

impl FieldCipher {
    /// Create an orchestrator with no entities configured.
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            configs: HashMap::new(),
        }
    }

    /// Attach field encryption to an entity type.
    ///
    /// Resolves `raw` against the environment and registers the result.
    /// On error nothing is registered: a failed setup leaves the entity
    /// exactly as unconfigured as it started.
    pub fn configure(
        &mut self,
        entity: impl Into<String>,
        raw: RawEntityConfig,
    ) -> Result<(), CipherError> {
        let config = EntityCipherConfig::resolve(raw, &self.env)?;
        self.configs.insert(entity.into(), config);
        Ok(())
    }

    /// The resolved config for an entity, if one is registered.
    pub fn config(&self, entity: &str) -> Option<&EntityCipherConfig> {
        self.configs.get(entity)
    }

    /// Encrypt the configured fields of a record about to be written.
    ///
    /// A record for an unconfigured entity passes through unchanged, as do
    /// configured fields that are absent or empty — there is nothing to
    /// encrypt in an empty value, and an absent one is the caller's business.
    pub fn before_write(&self, entity: &str, mut record: Record) -> Result<Record, CipherError> {
        let Some(config) = self.configs.get(entity) else {
            return Ok(record);
        };

        if let Some(fields) = record.get_mut(entity) {
            for name in config.fields() {
                if let Some(value) = fields.get_mut(name) {
                    if value.is_empty() {
                        continue;
                    }
                    *value = engine::encrypt_value(value, config)?;
                }
            }
        }

        Ok(record)
    }

    /// Decrypt the configured fields of records just read back.
    ///
    /// Results pass through unchanged when the entity is unconfigured, the
    /// result set is empty, `primary` is false (the records arrived through
    /// an association rather than a direct query), or the entity was
    /// configured with auto-decrypt off. Associated data is left encrypted
    /// deliberately: it may belong to a foreign entity with a different key.
    ///
    /// Decode and integrity errors propagate to the caller rather than
    /// leaving garbage in the field.
    pub fn after_read(
        &self,
        entity: &str,
        mut results: Vec<Record>,
        primary: bool,
    ) -> Result<Vec<Record>, CipherError> {
        let Some(config) = self.configs.get(entity) else {
            return Ok(results);
        };
        if results.is_empty() || !primary || !config.auto_decrypt() {
            return Ok(results);
        }

        for record in results.iter_mut() {
            // A joined result row may not carry this entity at all.
            let Some(fields) = record.get_mut(entity) else {
                continue;
            };
            for name in config.fields() {
                if let Some(value) = fields.get_mut(name) {
                    if value.is_empty() {
                        continue;
                    }
                    *value = engine::decrypt_value(value, config)?;
                }
            }
        }

        Ok(results)
    }

    /// Encrypt a single value under an entity's config.
    ///
    /// The explicit counterpart of [`before_write`](Self::before_write) for
    /// callers working outside the record pipeline.
    pub fn encrypt_field(&self, entity: &str, value: &str) -> Result<String, CipherError> {
        let config = self
            .configs
            .get(entity)
            .ok_or_else(|| CipherError::UnknownEntity(entity.to_string()))?;
        engine::encrypt_value(value, config)
    }

    /// Decrypt a single value under an entity's config.
    ///
    /// This is how fields come back when an entity is configured with
    /// auto-decrypt off.
    pub fn decrypt_field(&self, entity: &str, value: &str) -> Result<String, CipherError> {
        let config = self
            .configs
            .get(entity)
            .ok_or_else(|| CipherError::UnknownEntity(entity.to_string()))?;
        engine::decrypt_value(value, config)
    }
}
