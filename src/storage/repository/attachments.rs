// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Attachment records attached to documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Repository, StoredRecord};
use crate::crypto::{EncryptionMode, ProtectedValue};
use crate::storage::{OwnedResource, RecordKind, StorageResult};

/// Attachment stored on the filesystem.
///
/// Like photos, attachments carry the parent document's owner in `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentRecord {
    pub id: String,
    pub document_id: String,
    pub user_id: String,
    /// Original file name (metadata, not protected)
    pub file_name: String,
    pub content_type: String,
    #[serde(default)]
    pub encryption: EncryptionMode,
    pub data: String,
    pub created_at: DateTime<Utc>,
}

impl AttachmentRecord {
    pub fn new(
        id: impl Into<String>,
        document_id: impl Into<String>,
        user_id: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: ProtectedValue,
    ) -> Self {
        let (encryption, data) = data.into_stored();
        Self {
            id: id.into(),
            document_id: document_id.into(),
            user_id: user_id.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            encryption,
            data,
            created_at: Utc::now(),
        }
    }
}

impl OwnedResource for AttachmentRecord {
    fn owner_user_id(&self) -> &str {
        &self.user_id
    }

    fn resource_label(&self) -> String {
        format!("attachment {}", self.id)
    }
}

impl StoredRecord for AttachmentRecord {
    const KIND: RecordKind = RecordKind::Attachment;

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

impl Repository<'_, AttachmentRecord> {
    /// List attachments belonging to a document.
    pub fn list_by_document(&self, document_id: &str) -> StorageResult<Vec<AttachmentRecord>> {
        self.list_where(|attachment| attachment.document_id == document_id)
    }
}
