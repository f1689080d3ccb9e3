// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Document records.
//!
//! Title and content type are metadata and stay in the clear; only `data`
//! is protected. Photos and attachments hang off a document by
//! `document_id` and share its owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StoredRecord;
use crate::crypto::{EncryptionMode, ProtectedValue};
use crate::storage::{OwnedResource, RecordKind};

/// Document stored on the filesystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentRecord {
    /// Unique document identifier
    pub id: String,
    /// Owner user ID
    pub user_id: String,
    /// Display title
    pub title: String,
    /// MIME type of `data` once revealed
    pub content_type: String,
    #[serde(default)]
    pub encryption: EncryptionMode,
    /// Document body, plaintext or envelope per `encryption`
    pub data: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        title: impl Into<String>,
        content_type: impl Into<String>,
        data: ProtectedValue,
    ) -> Self {
        let now = Utc::now();
        let (encryption, data) = data.into_stored();
        Self {
            id: id.into(),
            user_id: user_id.into(),
            title: title.into(),
            content_type: content_type.into(),
            encryption,
            data,
            created_at: now,
            updated_at: now,
        }
    }
}

impl OwnedResource for DocumentRecord {
    fn owner_user_id(&self) -> &str {
        &self.user_id
    }

    fn resource_label(&self) -> String {
        format!("document {}", self.id)
    }
}

impl StoredRecord for DocumentRecord {
    const KIND: RecordKind = RecordKind::Document;

    fn id(&self) -> &str {
        &self.id
    }

    fn payload(&self) -> ProtectedValue {
        ProtectedValue::from_stored(self.encryption, self.data.clone())
    }

    fn set_payload(&mut self, value: ProtectedValue) {
        let (encryption, data) = value.into_stored();
        self.encryption = encryption;
        self.data = data;
        self.updated_at = Utc::now();
    }
}
