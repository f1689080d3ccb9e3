// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-user key derivation.
//!
//! A single HMAC-SHA256 invocation keyed with the master key over the UTF-8
//! bytes of the user id, truncated to the master key's length. The output is
//! a pure function of `(master_key, user_id)`, so any node holding the master
//! key can recompute the key for any record without a key store.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use super::master_key::check_key_length;
use super::{EncryptionError, EncryptionResult};

type HmacSha256 = Hmac<Sha256>;

/// Symmetric key for one user. Wiped on drop.
pub struct DerivedKey {
    bytes: Zeroizing<Vec<u8>>,
}

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl PartialEq for DerivedKey {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for DerivedKey {}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Derive the key for `user_id` from `master_key`.
///
/// # Errors
/// - `InvalidKeyMaterial` if `master_key` is empty or not 16/24/32 bytes
/// - `InvalidArgument` if `user_id` is blank
pub fn derive(master_key: &[u8], user_id: &str) -> EncryptionResult<DerivedKey> {
    check_key_length(master_key)?;
    require_owner(user_id)?;

    let mut mac = <HmacSha256 as Mac>::new_from_slice(master_key)
        .map_err(|e| EncryptionError::InvalidKeyMaterial(e.to_string()))?;
    mac.update(user_id.as_bytes());
    let mut output = mac.finalize().into_bytes();

    // SHA-256 output (32 bytes) covers every supported AES key length
    let bytes = Zeroizing::new(output[..master_key.len()].to_vec());
    output.as_mut_slice().zeroize();

    Ok(DerivedKey { bytes })
}

/// Reject blank owner identifiers.
pub(crate) fn require_owner(user_id: &str) -> EncryptionResult<()> {
    if user_id.trim().is_empty() {
        return Err(EncryptionError::InvalidArgument(
            "owner user id must not be blank".to_string(),
        ));
    }
    Ok(())
}
