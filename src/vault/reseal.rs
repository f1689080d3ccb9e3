// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Re-encrypting records written before a master key was configured.
//!
//! Plaintext records stay readable forever, so this is optional. It walks
//! every record kind, seals each `NO_ENCRYPTION` payload under its owner's
//! derived key and rewrites the record with the `AES_HMAC` tag.

use serde::Serialize;

use super::Vault;
use crate::crypto::ProtectedValue;
use crate::error::VaultResult;
use crate::storage::{
    AttachmentRecord, AuditEvent, AuditEventType, ClaimsRecord, DocumentRecord, PhotoRecord,
    Repository, StoredRecord,
};

/// Counts from one re-seal pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResealSummary {
    /// Records examined.
    pub scanned: usize,
    /// Plaintext records now encrypted.
    pub resealed: usize,
    /// Plaintext records that could not be rewritten.
    pub failed: usize,
}

impl ResealSummary {
    fn add(&mut self, other: ResealSummary) {
        self.scanned += other.scanned;
        self.resealed += other.resealed;
        self.failed += other.failed;
    }
}

impl Vault {
    /// Encrypt every plaintext record in place.
    ///
    /// Does nothing when no master key is configured. Individual failures
    /// are logged and counted; the pass continues.
    pub fn reseal_plaintext_records(&self) -> VaultResult<ResealSummary> {
        if !self.encryption.is_enabled() {
            tracing::warn!("Re-seal skipped: no master key configured");
            return Ok(ResealSummary::default());
        }

        let mut summary = ResealSummary::default();
        summary.add(self.reseal_kind::<ClaimsRecord>()?);
        summary.add(self.reseal_kind::<DocumentRecord>()?);
        summary.add(self.reseal_kind::<PhotoRecord>()?);
        summary.add(self.reseal_kind::<AttachmentRecord>()?);

        tracing::info!(
            scanned = summary.scanned,
            resealed = summary.resealed,
            failed = summary.failed,
            "Re-seal pass complete"
        );
        if summary.resealed > 0 || summary.failed > 0 {
            self.audit(
                AuditEvent::new(AuditEventType::RecordsResealed).with_details(
                    serde_json::json!({
                        "scanned": summary.scanned,
                        "resealed": summary.resealed,
                        "failed": summary.failed,
                    }),
                ),
            );
        }
        Ok(summary)
    }

    fn reseal_kind<R: StoredRecord>(&self) -> VaultResult<ResealSummary> {
        let repo = Repository::<R>::new(&self.storage);
        let kind = R::KIND;
        let mut summary = ResealSummary::default();

        for mut record in repo.list_all()? {
            summary.scanned += 1;

            let ProtectedValue::Plaintext(plaintext) = record.payload() else {
                continue;
            };

            let result = self
                .seal(kind, record.owner_user_id(), &plaintext)
                .and_then(|sealed| {
                    record.set_payload(sealed);
                    repo.update(&record).map_err(Into::into)
                });

            match result {
                Ok(()) => summary.resealed += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(
                        kind = %kind,
                        record_id = %record.id(),
                        error = %e,
                        "Failed to re-seal record"
                    );
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::crypto::{EncryptionMode, EncryptionService, MasterKey};
    use crate::storage::{AuditRepository, RecordStorage};
    use crate::vault::tests::{today, vault};
    use std::sync::Arc;

    fn with_key(storage: &RecordStorage) -> Vault {
        let key = MasterKey::from_base64("AAAAAAAAAAAAAAAAAAAAAA==").unwrap();
        Vault::new(storage.clone(), Arc::new(EncryptionService::new(Some(key)))).unwrap()
    }

    #[test]
    fn reseal_encrypts_legacy_records_of_every_kind() {
        let (_temp, plain) = vault(false);
        let alice = AuthenticatedUser::user("alice");

        let claims = plain.store_claims(&alice, "claims").unwrap();
        let doc = plain.store_document(&alice, "t", "text/plain", "doc").unwrap();
        let photo = plain.add_photo(&alice, &doc.id, "image/png", "photo").unwrap();
        let attachment = plain
            .add_attachment(&alice, &doc.id, "a.txt", "text/plain", "file")
            .unwrap();

        let vault = with_key(plain.storage());
        let summary = vault.reseal_plaintext_records().unwrap();
        assert_eq!(
            summary,
            ResealSummary {
                scanned: 4,
                resealed: 4,
                failed: 0
            }
        );

        let stored = Repository::<ClaimsRecord>::new(vault.storage())
            .get(&claims.id)
            .unwrap();
        assert_eq!(stored.encryption, EncryptionMode::AesHmac);
        assert_ne!(stored.claims, "claims");

        assert_eq!(vault.read_claims(&alice, &claims.id).unwrap().plaintext, "claims");
        assert_eq!(vault.read_document(&alice, &doc.id).unwrap().plaintext, "doc");
        assert_eq!(vault.read_photo(&alice, &photo.id).unwrap().plaintext, "photo");
        assert_eq!(
            vault.read_attachment(&alice, &attachment.id).unwrap().plaintext,
            "file"
        );

        let events = AuditRepository::new(vault.storage())
            .read_events(&today())
            .unwrap();
        assert!(events
            .iter()
            .any(|e| e.event_type == AuditEventType::RecordsResealed));
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let (_temp, vault) = vault(true);
        vault
            .store_claims(&AuthenticatedUser::user("alice"), "x")
            .unwrap();

        let summary = vault.reseal_plaintext_records().unwrap();
        assert_eq!(summary.scanned, 1);
        assert_eq!(summary.resealed, 0);
    }

    #[test]
    fn reseal_without_key_does_nothing() {
        let (_temp, vault) = vault(false);
        vault
            .store_claims(&AuthenticatedUser::user("alice"), "x")
            .unwrap();
        assert_eq!(
            vault.reseal_plaintext_records().unwrap(),
            ResealSummary::default()
        );
    }
}
