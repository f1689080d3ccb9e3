// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! AES-CBC envelope cipher.
//!
//! ## Envelope Layout
//!
//! ```text
//! [ IV (16 bytes) ][ ciphertext (n * 16 bytes, PKCS#7 padded) ]
//! ```
//!
//! The AES variant (128/192/256) follows the key length. The IV is drawn from
//! the OS CSPRNG on every call and travels unencrypted in front of the
//! ciphertext.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use ring::rand::{SecureRandom, SystemRandom};

use super::{EncryptionError, EncryptionResult};

/// AES block size, and therefore IV length.
pub const IV_LEN: usize = 16;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes192CbcEnc = cbc::Encryptor<aes::Aes192>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes192CbcDec = cbc::Decryptor<aes::Aes192>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Encrypt `plaintext` under `key` with a fresh random IV.
///
/// Returns `IV || ciphertext`; the length is always `16 + 16 * k` for k >= 1.
pub fn seal(key: &[u8], plaintext: &[u8]) -> EncryptionResult<Vec<u8>> {
    let mut iv = [0u8; IV_LEN];
    SystemRandom::new()
        .fill(&mut iv)
        .map_err(|_| EncryptionError::Cipher("failed to generate IV".to_string()))?;
    seal_with_iv(key, &iv, plaintext)
}

/// Decrypt an `IV || ciphertext` envelope.
///
/// # Errors
/// - `MalformedEnvelope` if the envelope is shorter than one IV
/// - `DecryptionFailed` on bad padding, partial blocks or a wrong key
pub fn open(key: &[u8], envelope: &[u8]) -> EncryptionResult<Vec<u8>> {
    if envelope.len() < IV_LEN {
        return Err(EncryptionError::MalformedEnvelope(format!(
            "envelope too short: {} bytes, need at least {IV_LEN}",
            envelope.len()
        )));
    }
    let (iv, ciphertext) = envelope.split_at(IV_LEN);

    let plaintext = match key.len() {
        16 => Aes128CbcDec::new_from_slices(key, iv)
            .map(|dec| dec.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)),
        24 => Aes192CbcDec::new_from_slices(key, iv)
            .map(|dec| dec.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)),
        32 => Aes256CbcDec::new_from_slices(key, iv)
            .map(|dec| dec.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)),
        other => return Err(unsupported_key(other)),
    }
    .map_err(|e| EncryptionError::Cipher(format!("cipher init failed: {e}")))?;

    plaintext.map_err(|_| {
        EncryptionError::DecryptionFailed("bad padding or wrong key".to_string())
    })
}

pub(crate) fn seal_with_iv(
    key: &[u8],
    iv: &[u8; IV_LEN],
    plaintext: &[u8],
) -> EncryptionResult<Vec<u8>> {
    let ciphertext = match key.len() {
        16 => Aes128CbcEnc::new_from_slices(key, iv)
            .map(|enc| enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
        24 => Aes192CbcEnc::new_from_slices(key, iv)
            .map(|enc| enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
        32 => Aes256CbcEnc::new_from_slices(key, iv)
            .map(|enc| enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
        other => return Err(unsupported_key(other)),
    }
    .map_err(|e| EncryptionError::Cipher(format!("cipher init failed: {e}")))?;

    let mut envelope = Vec::with_capacity(IV_LEN + ciphertext.len());
    envelope.extend_from_slice(iv);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}

fn unsupported_key(len: usize) -> EncryptionError {
    EncryptionError::InvalidKeyMaterial(format!(
        "unsupported AES key length {len} bytes"
    ))
}
