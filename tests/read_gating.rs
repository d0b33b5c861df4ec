//! Tests for the read-path gates: primary, auto-decrypt, unconfigured
//! entities. A gate that fails open silently hands ciphertext keys to the
//! wrong context; a gate that fails closed corrupts data. Both directions
//! are pinned here.

use std::collections::HashMap;

use fieldseal::config::{Environment, ModeRequest, RawEntityConfig};
use fieldseal::{FieldCipher, Record};

fn environment() -> Environment {
    Environment {
        secret: "s3cr3tKeyThatIsLongEnough".to_string(),
        cipher_seed: "8675309".to_string(),
        block_cipher_available: true,
    }
}

fn configured_cipher(auto_decrypt: bool) -> FieldCipher {
    let mut cipher = FieldCipher::new(environment());
    cipher
        .configure(
            "User",
            RawEntityConfig {
                fields: vec!["password".to_string()],
                auto_decrypt: Some(auto_decrypt),
                cipher: ModeRequest::BlockCbc,
                ..Default::default()
            },
        )
        .unwrap();
    cipher
}

fn encrypted_user_result(cipher: &FieldCipher) -> Record {
    let mut fields = HashMap::new();
    fields.insert("password".to_string(), "hunter2".to_string());
    fields.insert("name".to_string(), "bob".to_string());
    let mut record = HashMap::new();
    record.insert("User".to_string(), fields);
    cipher.before_write("User", record).unwrap()
}

#[test]
fn test_association_reads_stay_encrypted() {
    // A record fetched through a join (`primary == false`) must never be
    // decrypted, whatever the auto-decrypt setting says.

    let cipher = configured_cipher(true);
    let stored = encrypted_user_result(&cipher);
    let ciphertext = stored["User"]["password"].clone();

    let results = cipher.after_read("User", vec![stored], false).unwrap();
    assert_eq!(results[0]["User"]["password"], ciphertext);
}

#[test]
fn test_auto_decrypt_off_stays_encrypted() {
    let cipher = configured_cipher(false);
    let stored = encrypted_user_result(&cipher);
    let ciphertext = stored["User"]["password"].clone();

    // Even a primary read leaves the value alone.
    let results = cipher.after_read("User", vec![stored], true).unwrap();
    assert_eq!(results[0]["User"]["password"], ciphertext);
}

#[test]
fn test_explicit_decrypt_when_auto_is_off() {
    // auto_decrypt == false means "decrypt on demand", not "never".

    let cipher = configured_cipher(false);
    let stored = encrypted_user_result(&cipher);

    let plaintext = cipher
        .decrypt_field("User", &stored["User"]["password"])
        .unwrap();
    assert_eq!(plaintext, "hunter2");
}

#[test]
fn test_unconfigured_entity_is_a_no_op() {
    let cipher = configured_cipher(true);

    let mut fields = HashMap::new();
    fields.insert("password".to_string(), "hunter2".to_string());
    let mut record: Record = HashMap::new();
    record.insert("Comment".to_string(), fields);

    // Writes and reads for an entity with no config pass through untouched.
    let written = cipher.before_write("Comment", record.clone()).unwrap();
    assert_eq!(written, record);

    let results = cipher
        .after_read("Comment", vec![record.clone()], true)
        .unwrap();
    assert_eq!(results, vec![record]);
}

#[test]
fn test_result_without_entity_submap_is_skipped() {
    // A joined result row may carry only the foreign entity's data.

    let cipher = configured_cipher(true);
    let stored = encrypted_user_result(&cipher);

    let mut foreign_fields = HashMap::new();
    foreign_fields.insert("body".to_string(), "a comment".to_string());
    let mut foreign_only: Record = HashMap::new();
    foreign_only.insert("Comment".to_string(), foreign_fields);

    let results = cipher
        .after_read("User", vec![foreign_only.clone(), stored], true)
        .unwrap();

    // The row without a User sub-map is untouched; the row with one decrypts.
    assert_eq!(results[0], foreign_only);
    assert_eq!(results[1]["User"]["password"], "hunter2");
}

#[test]
fn test_empty_results_pass_through() {
    let cipher = configured_cipher(true);
    let results = cipher.after_read("User", Vec::new(), true).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_explicit_field_ops_require_a_config() {
    use fieldseal::error::CipherError;

    let cipher = configured_cipher(true);
    assert!(matches!(
        cipher.encrypt_field("Comment", "hunter2"),
        Err(CipherError::UnknownEntity(name)) if name == "Comment"
    ));
}
