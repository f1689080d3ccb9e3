// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Field-Level Envelope Encryption
//!
//! Every stored payload (claims blob, document data, photo data, attachment
//! data) is encrypted under a key that is derived on demand from the process
//! master key and the owning user's identifier.
//!
//! ## Key Hierarchy
//!
//! ```text
//! VAULT_MASTER_KEY (base64, 16/24/32 bytes, loaded once at startup)
//!         │
//!         │  HMAC-SHA256(master_key, utf8(user_id)) truncated to key length
//!         ▼
//! derived key (per user, never stored, never cached)
//!         │
//!         │  AES-CBC + PKCS#7, fresh random IV
//!         ▼
//! base64(IV || ciphertext)  ──► stored next to its EncryptionMode tag
//! ```
//!
//! ## Mode Tags
//!
//! Each record carries the [`EncryptionMode`] it was written with. Reads
//! always follow the stored tag, never the current configuration, so
//! plaintext rows written before a master key was configured stay readable.
//!
//! ## Security Note
//!
//! CBC without a MAC does not authenticate the ciphertext. Padding checks
//! reject most tampering and wrong-key reads, but a successful decrypt is not
//! proof of integrity.

pub mod cipher;
pub mod error;
pub mod kdf;
pub mod master_key;
pub mod service;

pub use error::{EncryptionError, EncryptionResult};
pub use kdf::DerivedKey;
pub use master_key::MasterKey;
pub use service::{EncryptionMode, EncryptionService, ProtectedValue};
