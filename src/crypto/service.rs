// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Encryption service: mode selection plus encrypt/decrypt per payload kind.
//!
//! The service is immutable after construction and holds no per-call state,
//! so a single instance can be shared across threads behind an `Arc`.

use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};

use super::kdf::{self, require_owner};
use super::{cipher, EncryptionError, EncryptionResult, MasterKey};

/// Encryption mode recorded with every stored payload.
///
/// Serialized as `NO_ENCRYPTION` / `AES_HMAC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EncryptionMode {
    /// Payload stored verbatim.
    NoEncryption,
    /// Payload stored as `base64(IV || AES-CBC ciphertext)` under the
    /// owner's derived key.
    AesHmac,
}

impl EncryptionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionMode::NoEncryption => "NO_ENCRYPTION",
            EncryptionMode::AesHmac => "AES_HMAC",
        }
    }
}

impl Default for EncryptionMode {
    /// Records persisted before the tag existed hold plaintext.
    fn default() -> Self {
        EncryptionMode::NoEncryption
    }
}

impl std::fmt::Display for EncryptionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payload together with how it is protected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectedValue {
    /// Stored as-is.
    Plaintext(String),
    /// Base64 envelope (`IV || ciphertext`).
    Encrypted(String),
}

impl ProtectedValue {
    /// Rebuild from the `(mode, value)` pair a record was persisted with.
    pub fn from_stored(mode: EncryptionMode, value: String) -> Self {
        match mode {
            EncryptionMode::NoEncryption => ProtectedValue::Plaintext(value),
            EncryptionMode::AesHmac => ProtectedValue::Encrypted(value),
        }
    }

    /// Split into the `(mode, value)` pair the persistence layer stores.
    pub fn into_stored(self) -> (EncryptionMode, String) {
        match self {
            ProtectedValue::Plaintext(value) => (EncryptionMode::NoEncryption, value),
            ProtectedValue::Encrypted(value) => (EncryptionMode::AesHmac, value),
        }
    }

    pub fn mode(&self) -> EncryptionMode {
        match self {
            ProtectedValue::Plaintext(_) => EncryptionMode::NoEncryption,
            ProtectedValue::Encrypted(_) => EncryptionMode::AesHmac,
        }
    }

    /// The stored string (plaintext or base64 envelope).
    pub fn as_str(&self) -> &str {
        match self {
            ProtectedValue::Plaintext(value) | ProtectedValue::Encrypted(value) => value,
        }
    }
}

/// Encrypts and decrypts payloads keyed by the owning user.
///
/// With a master key, new writes are sealed under
/// `derive(master_key, owner)`; without one, new writes are stored in
/// plaintext. Reads always follow the mode stored with the record.
#[derive(Debug, Clone)]
pub struct EncryptionService {
    master_key: Option<MasterKey>,
}

impl EncryptionService {
    /// Build the service from the startup configuration.
    ///
    /// Logs a single warning here when no master key is configured; the
    /// per-call paths stay silent.
    pub fn new(master_key: Option<MasterKey>) -> Self {
        match &master_key {
            Some(key) => tracing::info!(
                key_bits = key.bits(),
                "Field encryption enabled (AES-CBC, per-user derived keys)"
            ),
            None => tracing::warn!(
                "No master key configured; new records will be stored WITHOUT encryption"
            ),
        }
        Self { master_key }
    }

    /// Service that never encrypts new writes.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Whether new writes are encrypted.
    pub fn is_enabled(&self) -> bool {
        self.master_key.is_some()
    }

    /// Mode new writes will be tagged with.
    pub fn write_mode(&self) -> EncryptionMode {
        if self.is_enabled() {
            EncryptionMode::AesHmac
        } else {
            EncryptionMode::NoEncryption
        }
    }

    /// Protect `plaintext` for `owner_user_id` using the configured mode.
    pub fn protect(&self, owner_user_id: &str, plaintext: &str) -> EncryptionResult<ProtectedValue> {
        require_owner(owner_user_id)?;

        let Some(master_key) = &self.master_key else {
            return Ok(ProtectedValue::Plaintext(plaintext.to_string()));
        };

        let key = kdf::derive(master_key.as_bytes(), owner_user_id)?;
        let envelope = cipher::seal(key.as_bytes(), plaintext.as_bytes())?;
        Ok(ProtectedValue::Encrypted(Base64::encode_string(&envelope)))
    }

    /// Recover the plaintext of `value` for `owner_user_id`.
    ///
    /// An encrypted value with no master key configured is a hard failure:
    /// nothing falls back to returning the envelope as plaintext.
    pub fn reveal(&self, owner_user_id: &str, value: &ProtectedValue) -> EncryptionResult<String> {
        require_owner(owner_user_id)?;

        let encoded = match value {
            ProtectedValue::Plaintext(plaintext) => return Ok(plaintext.clone()),
            ProtectedValue::Encrypted(encoded) => encoded,
        };

        let master_key = self.master_key.as_ref().ok_or_else(|| {
            EncryptionError::InvalidKeyMaterial("master key not configured".to_string())
        })?;

        let envelope = Base64::decode_vec(encoded.trim()).map_err(|_| {
            EncryptionError::MalformedEnvelope("stored value is not valid base64".to_string())
        })?;
        if envelope.len() < cipher::IV_LEN {
            return Err(EncryptionError::MalformedEnvelope(
                "envelope too short".to_string(),
            ));
        }

        let key = kdf::derive(master_key.as_bytes(), owner_user_id)?;
        let plaintext = cipher::open(key.as_bytes(), &envelope)?;

        String::from_utf8(plaintext).map_err(|_| {
            EncryptionError::DecryptionFailed("decrypted payload is not valid UTF-8".to_string())
        })
    }

    /// Encrypt for storage, returning the `(mode, value)` pair to persist.
    pub fn encrypt(
        &self,
        owner_user_id: &str,
        plaintext: &str,
    ) -> EncryptionResult<(EncryptionMode, String)> {
        self.protect(owner_user_id, plaintext)
            .map(ProtectedValue::into_stored)
    }

    /// Decrypt a stored `(mode, value)` pair.
    pub fn decrypt(
        &self,
        owner_user_id: &str,
        mode: EncryptionMode,
        stored_value: &str,
    ) -> EncryptionResult<String> {
        let value = ProtectedValue::from_stored(mode, stored_value.to_string());
        self.reveal(owner_user_id, &value)
    }

    /// Seal and open a fixed sample value to confirm the configured key works.
    ///
    /// A no-op when encryption is disabled.
    pub fn self_test(&self) -> EncryptionResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        const SAMPLE_OWNER: &str = "self-test";
        const SAMPLE: &str = "vault self-test";

        let sealed = self.protect(SAMPLE_OWNER, SAMPLE)?;
        if sealed.as_str() == SAMPLE {
            return Err(EncryptionError::Cipher(
                "self-test produced plaintext output".to_string(),
            ));
        }
        let opened = self.reveal(SAMPLE_OWNER, &sealed)?;
        if opened != SAMPLE {
            return Err(EncryptionError::DecryptionFailed(
                "self-test round trip mismatch".to_string(),
            ));
        }
        Ok(())
    }

    // ========== Per-Kind Entry Points ==========

    /// Encrypt a user's claims blob.
    pub fn encrypt_claims(
        &self,
        user_id: &str,
        claims: &str,
    ) -> EncryptionResult<(EncryptionMode, String)> {
        self.encrypt(user_id, claims)
    }

    pub fn decrypt_claims(
        &self,
        user_id: &str,
        mode: EncryptionMode,
        stored_value: &str,
    ) -> EncryptionResult<String> {
        self.decrypt(user_id, mode, stored_value)
    }

    /// Encrypt document data for the document's owner.
    pub fn encrypt_document_data(
        &self,
        document_owner_id: &str,
        data: &str,
    ) -> EncryptionResult<(EncryptionMode, String)> {
        self.encrypt(document_owner_id, data)
    }

    pub fn decrypt_document_data(
        &self,
        document_owner_id: &str,
        mode: EncryptionMode,
        stored_value: &str,
    ) -> EncryptionResult<String> {
        self.decrypt(document_owner_id, mode, stored_value)
    }

    /// Encrypt photo data. The key belongs to the owner of the parent
    /// document, not to whoever uploaded the photo.
    pub fn encrypt_photo_data(
        &self,
        document_owner_id: &str,
        data: &str,
    ) -> EncryptionResult<(EncryptionMode, String)> {
        self.encrypt(document_owner_id, data)
    }

    pub fn decrypt_photo_data(
        &self,
        document_owner_id: &str,
        mode: EncryptionMode,
        stored_value: &str,
    ) -> EncryptionResult<String> {
        self.decrypt(document_owner_id, mode, stored_value)
    }

    /// Encrypt attachment data under the parent document owner's key.
    pub fn encrypt_attachment_data(
        &self,
        document_owner_id: &str,
        data: &str,
    ) -> EncryptionResult<(EncryptionMode, String)> {
        self.encrypt(document_owner_id, data)
    }

    pub fn decrypt_attachment_data(
        &self,
        document_owner_id: &str,
        mode: EncryptionMode,
        stored_value: &str,
    ) -> EncryptionResult<String> {
        self.decrypt(document_owner_id, mode, stored_value)
    }
}
