// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claims Vault - per-user field-level envelope encryption
//!
//! This crate stores sensitive per-user items (claims, documents, photos,
//! attachments) with the payload field encrypted under a key derived from a
//! single master secret and the owning user's identifier.
//!
//! ## Modules
//!
//! - `crypto` - Key derivation, AES-CBC envelope cipher, encryption service
//! - `storage` - JSON record storage, repositories, ownership, audit log
//! - `auth` - Caller identity and roles
//! - `vault` - Authorize, encrypt, persist and audit in one place
//! - `config` - Environment configuration
//! - `logging` - Tracing subscriber setup

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod storage;
pub mod vault;

pub use crypto::{EncryptionError, EncryptionMode, EncryptionService, MasterKey, ProtectedValue};
pub use error::{VaultError, VaultResult};
pub use vault::{Opened, ResealSummary, Vault};
