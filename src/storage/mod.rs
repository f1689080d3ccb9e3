// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Record Storage Module
//!
//! Persistence for per-user records. Every record stores its payload field
//! together with the [`EncryptionMode`](crate::crypto::EncryptionMode) tag it
//! was written with; this layer never encrypts or decrypts anything itself.
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   claims/{id}.json        # Claims blob per user
//!   documents/{id}.json     # Document metadata + data
//!   photos/{id}.json        # Photo data, linked to a document
//!   attachments/{id}.json   # Attachment data, linked to a document
//!   audit/
//!     {date}/events.jsonl   # Daily audit logs
//! ```

pub mod audit;
pub mod ownership;
pub mod paths;
pub mod record_fs;
pub mod repository;

pub use audit::{AuditEvent, AuditEventType, AuditRepository};
pub use ownership::{OwnedResource, OwnershipEnforcer};
pub use paths::StoragePaths;
pub use record_fs::{RecordStorage, StorageError, StorageResult};
pub use repository::{
    AttachmentRecord, ClaimsRecord, DocumentRecord, PhotoRecord, Repository, StoredRecord,
};

/// The payload kinds the vault stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Claims,
    Document,
    Photo,
    Attachment,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Claims,
        RecordKind::Document,
        RecordKind::Photo,
        RecordKind::Attachment,
    ];

    /// Name used in audit entries and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Claims => "claims",
            RecordKind::Document => "document",
            RecordKind::Photo => "photo",
            RecordKind::Attachment => "attachment",
        }
    }

    /// Directory under the data root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            RecordKind::Claims => "claims",
            RecordKind::Document => "documents",
            RecordKind::Photo => "photos",
            RecordKind::Attachment => "attachments",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
