// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Encryption errors.

/// Error type for key derivation and envelope encryption.
///
/// Crypto failures are deterministic for a given input, so none of these
/// are retried by callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncryptionError {
    /// Master key missing, empty, or of an unsupported length.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Blank owner identifier or similar caller mistake.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Stored value is not valid base64 or is shorter than one IV.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Cipher rejected the input (bad padding, wrong key, not UTF-8).
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Provider-level failure (RNG, cipher initialization).
    #[error("cipher error: {0}")]
    Cipher(String),
}

impl EncryptionError {
    /// Short machine-readable code, used in audit details and logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            EncryptionError::InvalidKeyMaterial(_) => "invalid_key_material",
            EncryptionError::InvalidArgument(_) => "invalid_argument",
            EncryptionError::MalformedEnvelope(_) => "malformed_envelope",
            EncryptionError::DecryptionFailed(_) => "decryption_failed",
            EncryptionError::Cipher(_) => "cipher_error",
        }
    }
}

/// Result type for encryption operations.
pub type EncryptionResult<T> = Result<T, EncryptionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        let err = EncryptionError::MalformedEnvelope("envelope too short".to_string());
        assert_eq!(err.to_string(), "malformed envelope: envelope too short");
    }

    #[test]
    fn error_codes_are_distinct() {
        let codes = [
            EncryptionError::InvalidKeyMaterial(String::new()).error_code(),
            EncryptionError::InvalidArgument(String::new()).error_code(),
            EncryptionError::MalformedEnvelope(String::new()).error_code(),
            EncryptionError::DecryptionFailed(String::new()).error_code(),
            EncryptionError::Cipher(String::new()).error_code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }
}
