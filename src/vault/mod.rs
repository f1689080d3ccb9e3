// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Vault
//!
//! Entry point for callers. Every operation follows the same order:
//!
//! ```text
//! load record ──► verify ownership ──► encrypt / decrypt ──► persist ──► audit
//! ```
//!
//! Denied accesses and decryption failures are audited as failed events.
//! An audit write that fails is logged and never fails the operation.
//!
//! Photos and attachments are always sealed and opened with the parent
//! document owner's derived key, whoever the caller is.

mod claims;
mod documents;
mod reseal;

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::auth::{AuthenticatedUser, Role};
use crate::crypto::{EncryptionService, ProtectedValue};
use crate::error::{VaultError, VaultResult};
use crate::storage::{
    AuditEvent, AuditEventType, AuditRepository, OwnershipEnforcer, RecordKind, RecordStorage,
    StoredRecord,
};

pub use reseal::ResealSummary;

/// A record together with its revealed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Opened<R> {
    pub record: R,
    pub plaintext: String,
}

/// Record store with per-user field encryption.
pub struct Vault {
    storage: RecordStorage,
    encryption: Arc<EncryptionService>,
}

impl Vault {
    /// Wrap an initialized storage and a shared encryption service.
    pub fn new(storage: RecordStorage, encryption: Arc<EncryptionService>) -> VaultResult<Self> {
        if !storage.is_initialized() {
            return Err(VaultError::Storage(crate::storage::StorageError::NotInitialized));
        }
        Ok(Self {
            storage,
            encryption,
        })
    }

    pub fn storage(&self) -> &RecordStorage {
        &self.storage
    }

    pub fn encryption(&self) -> &EncryptionService {
        &self.encryption
    }

    /// Audit events for one day (`YYYY-MM-DD`). Auditors and admins only.
    pub fn audit_events(
        &self,
        user: &AuthenticatedUser,
        date: &str,
    ) -> VaultResult<Vec<AuditEvent>> {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| VaultError::InvalidArgument(format!("invalid audit date: {date:?}")))?
            .format("%Y-%m-%d")
            .to_string();

        if !user.has_role(Role::Auditor) {
            self.audit(
                AuditEvent::new(AuditEventType::PermissionDenied)
                    .with_user(&user.user_id)
                    .with_resource("audit", &day)
                    .failed("auditor role required"),
            );
            return Err(VaultError::PermissionDenied {
                user_id: user.user_id.clone(),
                resource: format!("audit log {day}"),
            });
        }

        let events = match AuditRepository::new(&self.storage).read_events(&day) {
            Ok(events) => events,
            Err(crate::storage::StorageError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        self.audit(
            AuditEvent::new(AuditEventType::AuditAccessed)
                .with_user(&user.user_id)
                .with_resource("audit", &day),
        );
        Ok(events)
    }

    // ========== Shared Steps ==========

    /// Append an audit event; failures are logged only.
    fn audit(&self, event: AuditEvent) {
        if let Err(e) = AuditRepository::new(&self.storage).log(&event) {
            tracing::warn!(
                event_type = ?event.event_type,
                error = %e,
                "Failed to write audit event"
            );
        }
    }

    /// Verify `user` may access `record`, auditing a denial.
    fn authorize<R: StoredRecord>(&self, user: &AuthenticatedUser, record: &R) -> VaultResult<()> {
        if let Err(e) = record.verify_ownership(user) {
            let kind = R::KIND;
            tracing::warn!(
                user_id = %user.user_id,
                kind = %kind,
                record_id = %record.id(),
                "Access denied"
            );
            self.audit(
                AuditEvent::new(AuditEventType::PermissionDenied)
                    .with_user(&user.user_id)
                    .with_resource(R::KIND.as_str(), record.id())
                    .failed("not the owner"),
            );
            return Err(e.into());
        }
        Ok(())
    }

    /// Seal a `kind` payload for `owner_user_id` through that kind's entry
    /// point. Photos and attachments pass the document owner.
    fn seal(
        &self,
        kind: RecordKind,
        owner_user_id: &str,
        plaintext: &str,
    ) -> VaultResult<ProtectedValue> {
        let service = &self.encryption;
        let (mode, value) = match kind {
            RecordKind::Claims => service.encrypt_claims(owner_user_id, plaintext)?,
            RecordKind::Document => service.encrypt_document_data(owner_user_id, plaintext)?,
            RecordKind::Photo => service.encrypt_photo_data(owner_user_id, plaintext)?,
            RecordKind::Attachment => service.encrypt_attachment_data(owner_user_id, plaintext)?,
        };
        Ok(ProtectedValue::from_stored(mode, value))
    }

    /// Reveal the payload of `record` with `key_owner`'s derived key,
    /// auditing a failure.
    fn reveal<R: StoredRecord>(
        &self,
        user: &AuthenticatedUser,
        record: &R,
        key_owner: &str,
    ) -> VaultResult<String> {
        let service = &self.encryption;
        let (mode, stored) = record.payload().into_stored();
        let result = match R::KIND {
            RecordKind::Claims => service.decrypt_claims(key_owner, mode, &stored),
            RecordKind::Document => service.decrypt_document_data(key_owner, mode, &stored),
            RecordKind::Photo => service.decrypt_photo_data(key_owner, mode, &stored),
            RecordKind::Attachment => service.decrypt_attachment_data(key_owner, mode, &stored),
        };

        result.map_err(|e| {
            let kind = R::KIND;
            tracing::warn!(
                kind = %kind,
                record_id = %record.id(),
                error = %e,
                "Failed to decrypt record"
            );
            self.audit(
                AuditEvent::new(AuditEventType::DecryptionFailed)
                    .with_user(&user.user_id)
                    .with_resource(kind.as_str(), record.id())
                    .with_details(serde_json::json!({
                        "encryption": mode.as_str(),
                        "code": e.error_code(),
                    }))
                    .failed(e.to_string()),
            );
            e.into()
        })
    }

    /// Audit a successful record operation.
    fn audit_success<R: StoredRecord>(
        &self,
        event_type: AuditEventType,
        user: &AuthenticatedUser,
        record: &R,
    ) {
        self.audit(
            AuditEvent::new(event_type)
                .with_user(&user.user_id)
                .with_resource(R::KIND.as_str(), record.id())
                .with_details(serde_json::json!({
                    "encryption": record.payload().mode().as_str(),
                })),
        );
    }
}

/// New record identifier.
fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
