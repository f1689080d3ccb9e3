// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Errors surfaced by [`Vault`](crate::Vault) operations.

use crate::crypto::EncryptionError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// Key derivation or envelope failure.
    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    /// Persistence failure other than a missing record or denied access.
    #[error("storage error: {0}")]
    Storage(StorageError),

    #[error("permission denied: {user_id} cannot access {resource}")]
    PermissionDenied { user_id: String, resource: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl VaultError {
    /// Short machine-readable code for audit entries.
    pub fn error_code(&self) -> &'static str {
        match self {
            VaultError::Encryption(e) => e.error_code(),
            VaultError::Storage(_) => "storage_error",
            VaultError::PermissionDenied { .. } => "permission_denied",
            VaultError::NotFound(_) => "not_found",
            VaultError::InvalidArgument(_) => "invalid_argument",
        }
    }
}

impl From<StorageError> for VaultError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => VaultError::NotFound(what),
            StorageError::PermissionDenied { user_id, resource } => {
                VaultError::PermissionDenied { user_id, resource }
            }
            StorageError::AlreadyExists(what) => {
                VaultError::InvalidArgument(format!("already exists: {what}"))
            }
            StorageError::InvalidId(id) => {
                VaultError::InvalidArgument(format!("invalid record id: {id:?}"))
            }
            other => VaultError::Storage(other),
        }
    }
}

pub type VaultResult<T> = Result<T, VaultError>;
