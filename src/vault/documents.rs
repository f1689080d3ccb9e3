// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Documents and their photos and attachments.

use super::{new_record_id, Opened, Vault};
use crate::auth::AuthenticatedUser;
use crate::error::VaultResult;
use crate::storage::{
    AttachmentRecord, AuditEvent, AuditEventType, DocumentRecord, PhotoRecord, RecordKind,
    Repository,
};

impl Vault {
    // ========== Documents ==========

    /// Store a document owned by the caller.
    pub fn store_document(
        &self,
        user: &AuthenticatedUser,
        title: &str,
        content_type: &str,
        data: &str,
    ) -> VaultResult<DocumentRecord> {
        let sealed = self.seal(RecordKind::Document, &user.user_id, data)?;
        let record = DocumentRecord::new(
            new_record_id(),
            &user.user_id,
            title,
            content_type,
            sealed,
        );

        Repository::<DocumentRecord>::new(&self.storage).create(&record)?;

        tracing::info!(
            user_id = %user.user_id,
            record_id = %record.id,
            encryption = %record.encryption,
            "Stored document"
        );
        self.audit_success(AuditEventType::RecordStored, user, &record);
        Ok(record)
    }

    pub fn read_document(
        &self,
        user: &AuthenticatedUser,
        document_id: &str,
    ) -> VaultResult<Opened<DocumentRecord>> {
        let record = self.authorized_document(user, document_id)?;
        let plaintext = self.reveal(user, &record, &record.user_id)?;
        self.audit_success(AuditEventType::RecordRead, user, &record);
        Ok(Opened { record, plaintext })
    }

    /// Delete a document together with its photos and attachments.
    pub fn delete_document(&self, user: &AuthenticatedUser, document_id: &str) -> VaultResult<()> {
        let document = self.authorized_document(user, document_id)?;

        let photos = Repository::<PhotoRecord>::new(&self.storage);
        let photo_ids: Vec<String> = photos
            .list_by_document(document_id)?
            .into_iter()
            .map(|photo| photo.id)
            .collect();
        for id in &photo_ids {
            photos.delete(id)?;
        }

        let attachments = Repository::<AttachmentRecord>::new(&self.storage);
        let attachment_ids: Vec<String> = attachments
            .list_by_document(document_id)?
            .into_iter()
            .map(|attachment| attachment.id)
            .collect();
        for id in &attachment_ids {
            attachments.delete(id)?;
        }

        Repository::<DocumentRecord>::new(&self.storage).delete(document_id)?;

        tracing::info!(
            user_id = %user.user_id,
            record_id = %document_id,
            photos = photo_ids.len(),
            attachments = attachment_ids.len(),
            "Deleted document"
        );
        self.audit(
            AuditEvent::new(AuditEventType::RecordDeleted)
                .with_user(&user.user_id)
                .with_resource("document", &document.id)
                .with_details(serde_json::json!({
                    "photos": photo_ids,
                    "attachments": attachment_ids,
                })),
        );
        Ok(())
    }

    /// All of the caller's documents, decrypted. Undecryptable ones are skipped.
    pub fn list_documents(
        &self,
        user: &AuthenticatedUser,
    ) -> VaultResult<Vec<Opened<DocumentRecord>>> {
        let records =
            Repository::<DocumentRecord>::new(&self.storage).list_by_owner(&user.user_id)?;

        Ok(records
            .into_iter()
            .filter_map(|record| {
                let plaintext = self.reveal(user, &record, &record.user_id).ok()?;
                Some(Opened { record, plaintext })
            })
            .collect())
    }

    // ========== Photos ==========

    /// Attach a photo to a document, sealed under the document owner's key.
    pub fn add_photo(
        &self,
        user: &AuthenticatedUser,
        document_id: &str,
        content_type: &str,
        data: &str,
    ) -> VaultResult<PhotoRecord> {
        let document = self.authorized_document(user, document_id)?;

        let sealed = self.seal(RecordKind::Photo, &document.user_id, data)?;
        let record = PhotoRecord::new(
            new_record_id(),
            &document.id,
            &document.user_id,
            content_type,
            sealed,
        );
        Repository::<PhotoRecord>::new(&self.storage).create(&record)?;

        self.audit_success(AuditEventType::RecordStored, user, &record);
        Ok(record)
    }

    pub fn read_photo(
        &self,
        user: &AuthenticatedUser,
        photo_id: &str,
    ) -> VaultResult<Opened<PhotoRecord>> {
        let record = Repository::<PhotoRecord>::new(&self.storage).get(photo_id)?;
        let document = self.authorized_document(user, &record.document_id)?;

        let plaintext = self.reveal(user, &record, &document.user_id)?;
        self.audit_success(AuditEventType::RecordRead, user, &record);
        Ok(Opened { record, plaintext })
    }

    /// Photos of one document, decrypted. Undecryptable ones are skipped.
    pub fn list_photos(
        &self,
        user: &AuthenticatedUser,
        document_id: &str,
    ) -> VaultResult<Vec<Opened<PhotoRecord>>> {
        let document = self.authorized_document(user, document_id)?;
        let records = Repository::<PhotoRecord>::new(&self.storage).list_by_document(document_id)?;

        Ok(records
            .into_iter()
            .filter_map(|record| {
                let plaintext = self.reveal(user, &record, &document.user_id).ok()?;
                Some(Opened { record, plaintext })
            })
            .collect())
    }

    // ========== Attachments ==========

    /// Attach a file to a document, sealed under the document owner's key.
    pub fn add_attachment(
        &self,
        user: &AuthenticatedUser,
        document_id: &str,
        file_name: &str,
        content_type: &str,
        data: &str,
    ) -> VaultResult<AttachmentRecord> {
        let document = self.authorized_document(user, document_id)?;

        let sealed = self.seal(RecordKind::Attachment, &document.user_id, data)?;
        let record = AttachmentRecord::new(
            new_record_id(),
            &document.id,
            &document.user_id,
            file_name,
            content_type,
            sealed,
        );
        Repository::<AttachmentRecord>::new(&self.storage).create(&record)?;

        self.audit_success(AuditEventType::RecordStored, user, &record);
        Ok(record)
    }

    pub fn read_attachment(
        &self,
        user: &AuthenticatedUser,
        attachment_id: &str,
    ) -> VaultResult<Opened<AttachmentRecord>> {
        let record = Repository::<AttachmentRecord>::new(&self.storage).get(attachment_id)?;
        let document = self.authorized_document(user, &record.document_id)?;

        let plaintext = self.reveal(user, &record, &document.user_id)?;
        self.audit_success(AuditEventType::RecordRead, user, &record);
        Ok(Opened { record, plaintext })
    }

    pub fn list_attachments(
        &self,
        user: &AuthenticatedUser,
        document_id: &str,
    ) -> VaultResult<Vec<Opened<AttachmentRecord>>> {
        let document = self.authorized_document(user, document_id)?;
        let records =
            Repository::<AttachmentRecord>::new(&self.storage).list_by_document(document_id)?;

        Ok(records
            .into_iter()
            .filter_map(|record| {
                let plaintext = self.reveal(user, &record, &document.user_id).ok()?;
                Some(Opened { record, plaintext })
            })
            .collect())
    }

    /// Load a document and check the caller may access it.
    fn authorized_document(
        &self,
        user: &AuthenticatedUser,
        document_id: &str,
    ) -> VaultResult<DocumentRecord> {
        let document = Repository::<DocumentRecord>::new(&self.storage).get(document_id)?;
        self.authorize(user, &document)?;
        Ok(document)
    }
}
