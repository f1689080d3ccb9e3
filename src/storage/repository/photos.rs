// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Photo records attached to documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Repository, StoredRecord};
use crate::crypto::{EncryptionMode, ProtectedValue};
use crate::storage::{OwnedResource, RecordKind, StorageResult};

/// Photo stored on the filesystem.
///
/// `user_id` is always the owner of the parent document, so the photo is
/// sealed under the same derived key as the document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhotoRecord {
    pub id: String,
    /// Parent document
    pub document_id: String,
    /// Owner of the parent document
    pub user_id: String,
    pub content_type: String,
    #[serde(default)]
    pub encryption: EncryptionMode,
    /// Image bytes as base64, or an envelope around them
    pub data: String,
    pub created_at: DateTime<Utc>,
}

impl PhotoRecord {
    pub fn new(
        id: impl Into<String>,
        document_id: impl Into<String>,
        user_id: impl Into<String>,
        content_type: impl Into<String>,
        data: ProtectedValue,
    ) -> Self {
        let (encryption, data) = data.into_stored();
        Self {
            id: id.into(),
            document_id: document_id.into(),
            user_id: user_id.into(),
            content_type: content_type.into(),
            encryption,
            data,
            created_at: Utc::now(),
        }
    }
}

impl OwnedResource for PhotoRecord {
    fn owner_user_id(&self) -> &str {
        &self.user_id
    }

    fn resource_label(&self) -> String {
        format!("photo {}", self.id)
    }
}

impl StoredRecord for PhotoRecord {
    const KIND: RecordKind = RecordKind::Photo;

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
    }
}

impl Repository<'_, PhotoRecord> {
    /// List photos belonging to a document.
    pub fn list_by_document(&self, document_id: &str) -> StorageResult<Vec<PhotoRecord>> {
        self.list_where(|photo| photo.document_id == document_id)
    }
}
