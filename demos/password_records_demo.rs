//! Minimal example: transparent password encryption around a save/find cycle.
//!
//! Run with: `cargo run --example password_records_demo`
//!
//! Walks the full pipeline: configure an entity, encrypt on write, observe
//! what storage would see, decrypt on a primary read, and see an
//! association read leave ciphertext alone.

use std::collections::HashMap;

use fieldseal::config::{Environment, ModeRequest, RawEntityConfig};
use fieldseal::{FieldCipher, Record};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Setup: inject the deployment secrets explicitly.
    let mut cipher = FieldCipher::new(Environment {
        secret: "s3cr3tKeyThatIsLongEnough".to_string(),
        cipher_seed: "76859309657453542496749683645".to_string(),
        block_cipher_available: true,
    });

    cipher.configure(
        "User",
        RawEntityConfig {
            fields: vec!["password".to_string()],
            cipher: ModeRequest::BlockCbc,
            ..Default::default()
        },
    )?;

    // 2. A record on its way to storage.
    let mut fields = HashMap::new();
    fields.insert("name".to_string(), "bob".to_string());
    fields.insert("password".to_string(), "hunter2".to_string());
    let mut record: Record = HashMap::new();
    record.insert("User".to_string(), fields);

    let written = cipher.before_write("User", record)?;
    println!("Stored name:     {}", written["User"]["name"]);
    println!("Stored password: {}", written["User"]["password"]);

    // 3. A primary read restores the plaintext.
    let results = cipher.after_read("User", vec![written.clone()], true)?;
    println!("Read password:   {}", results[0]["User"]["password"]);
    assert_eq!(results[0]["User"]["password"], "hunter2");

    // 4. The same rows fetched through an association stay encrypted.
    let associated = cipher.after_read("User", vec![written], false)?;
    println!("Joined password: {}", associated[0]["User"]["password"]);
    assert_ne!(associated[0]["User"]["password"], "hunter2");

    Ok(())
}
