// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stored envelopes decoded by hand, without going through the service.
//!
//! Anything holding the master key must be able to read a record with
//! nothing but HMAC-SHA256, AES-CBC and base64.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use claims_vault::{EncryptionMode, EncryptionService, MasterKey};

fn derive_by_hand(master: &[u8], user_id: &str) -> Vec<u8> {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(master).unwrap();
    mac.update(user_id.as_bytes());
    mac.finalize().into_bytes()[..master.len()].to_vec()
}

fn open_by_hand(master: &[u8], user_id: &str, stored: &str) -> Vec<u8> {
    let envelope = STANDARD.decode(stored).unwrap();
    let (iv, ciphertext) = envelope.split_at(16);
    let key = derive_by_hand(master, user_id);

    match key.len() {
        16 => cbc::Decryptor::<aes::Aes128>::new_from_slices(&key, iv)
            .unwrap()
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .unwrap(),
        24 => cbc::Decryptor::<aes::Aes192>::new_from_slices(&key, iv)
            .unwrap()
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .unwrap(),
        32 => cbc::Decryptor::<aes::Aes256>::new_from_slices(&key, iv)
            .unwrap()
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .unwrap(),
        other => panic!("unexpected key length {other}"),
    }
}

#[test]
fn envelope_opens_with_plain_primitives_for_every_key_size() {
    for len in [16usize, 24, 32] {
        let master: Vec<u8> = (0..len as u8).collect();
        let service = EncryptionService::new(Some(MasterKey::from_bytes(master.clone()).unwrap()));

        let (mode, stored) = service.encrypt_claims("alice", r#"{"tier":"gold"}"#).unwrap();
        assert_eq!(mode, EncryptionMode::AesHmac);
        assert_eq!(
            open_by_hand(&master, "alice", &stored),
            br#"{"tier":"gold"}"#.to_vec()
        );
    }
}

#[test]
fn envelope_length_is_iv_plus_padded_blocks() {
    let service = EncryptionService::new(Some(
        MasterKey::from_base64("AAAAAAAAAAAAAAAAAAAAAA==").unwrap(),
    ));

    // PKCS#7 always adds at least one byte, so 16 bytes of input pad to 32.
    for (plaintext_len, ciphertext_len) in [(0usize, 16usize), (1, 16), (15, 16), (16, 32), (33, 48)] {
        let plaintext = "x".repeat(plaintext_len);
        let (_, stored) = service.encrypt_document_data("alice", &plaintext).unwrap();
        let envelope = STANDARD.decode(&stored).unwrap();
        assert_eq!(envelope.len(), 16 + ciphertext_len, "plaintext length {plaintext_len}");
    }
}

#[test]
fn iv_is_fresh_per_call() {
    let service = EncryptionService::new(Some(
        MasterKey::from_base64("AAAAAAAAAAAAAAAAAAAAAA==").unwrap(),
    ));

    let ivs: std::collections::HashSet<Vec<u8>> = (0..32)
        .map(|_| {
            let (_, stored) = service.encrypt_claims("alice", "same").unwrap();
            STANDARD.decode(stored).unwrap()[..16].to_vec()
        })
        .collect();
    assert_eq!(ivs.len(), 32);
}

#[test]
fn derived_keys_differ_per_user() {
    let master = [7u8; 32];
    assert_ne!(
        derive_by_hand(&master, "alice"),
        derive_by_hand(&master, "bob")
    );

    let service = EncryptionService::new(Some(MasterKey::from_bytes(master.to_vec()).unwrap()));
    let (_, stored) = service.encrypt_claims("bob", "bob's claims").unwrap();
    assert_eq!(open_by_hand(&master, "bob", &stored), b"bob's claims".to_vec());
}
