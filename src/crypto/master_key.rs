// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-wide master key.

use base64ct::{Base64, Encoding};
use zeroize::Zeroizing;

use super::{EncryptionError, EncryptionResult};

/// AES key lengths accepted for the master key (and therefore derived keys).
pub const SUPPORTED_KEY_LENGTHS: [usize; 3] = [16, 24, 32];

/// Root secret from which every per-user key is derived.
///
/// Loaded once at startup and never mutated. The bytes are wiped when the
/// value is dropped and are never printed by `Debug`.
#[derive(Clone)]
pub struct MasterKey {
    bytes: Zeroizing<Vec<u8>>,
}

impl MasterKey {
    /// Wrap raw key bytes, rejecting lengths AES cannot use.
    pub fn from_bytes(bytes: Vec<u8>) -> EncryptionResult<Self> {
        let bytes = Zeroizing::new(bytes);
        check_key_length(&bytes)?;
        Ok(Self { bytes })
    }

    /// Decode a standard (padded) base64 key as supplied by configuration.
    pub fn from_base64(encoded: &str) -> EncryptionResult<Self> {
        let decoded = Base64::decode_vec(encoded.trim()).map_err(|_| {
            EncryptionError::InvalidKeyMaterial("master key is not valid base64".to_string())
        })?;
        Self::from_bytes(decoded)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Key size in bits (128, 192 or 256).
    pub fn bits(&self) -> usize {
        self.bytes.len() * 8
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}

/// Reject empty keys and lengths other than 128/192/256 bits.
pub(crate) fn check_key_length(key: &[u8]) -> EncryptionResult<()> {
    if key.is_empty() {
        return Err(EncryptionError::InvalidKeyMaterial(
            "master key is empty".to_string(),
        ));
    }
    if !SUPPORTED_KEY_LENGTHS.contains(&key.len()) {
        return Err(EncryptionError::InvalidKeyMaterial(format!(
            "unsupported key length {} bytes (expected 16, 24 or 32)",
            key.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_zero_key() {
        let key = MasterKey::from_base64("AAAAAAAAAAAAAAAAAAAAAA==").unwrap();
        assert_eq!(key.as_bytes(), &[0u8; 16]);
        assert_eq!(key.bits(), 128);
    }

    #[test]
    fn accepts_all_aes_sizes() {
        for len in SUPPORTED_KEY_LENGTHS {
            let key = MasterKey::from_bytes(vec![7u8; len]).unwrap();
            assert_eq!(key.as_bytes().len(), len);
        }
    }

    #[test]
    fn rejects_bad_lengths() {
        for len in [0usize, 1, 15, 17, 31, 33, 64] {
            let result = MasterKey::from_bytes(vec![1u8; len]);
            assert!(
                matches!(result, Err(EncryptionError::InvalidKeyMaterial(_))),
                "length {len} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_invalid_base64() {
        let result = MasterKey::from_base64("not base64 at all!");
        assert!(matches!(result, Err(EncryptionError::InvalidKeyMaterial(_))));
    }

    #[test]
    fn debug_does_not_leak_bytes() {
        let key = MasterKey::from_bytes(vec![0xAB; 32]).unwrap();
        let rendered = format!("{key:?}");
        assert!(rendered.contains("256"));
        assert!(!rendered.contains("171"));
    }
}
