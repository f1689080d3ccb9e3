// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claims operations.

use super::{new_record_id, Opened, Vault};
use crate::auth::AuthenticatedUser;
use crate::error::VaultResult;
use crate::storage::{AuditEventType, ClaimsRecord, RecordKind, Repository, StoredRecord};

impl Vault {
    /// Store a claims blob owned by the caller.
    pub fn store_claims(
        &self,
        user: &AuthenticatedUser,
        claims: &str,
    ) -> VaultResult<ClaimsRecord> {
        let sealed = self.seal(RecordKind::Claims, &user.user_id, claims)?;
        let record = ClaimsRecord::new(new_record_id(), &user.user_id, sealed);

        Repository::<ClaimsRecord>::new(&self.storage).create(&record)?;

        tracing::info!(
            user_id = %user.user_id,
            record_id = %record.id,
            encryption = %record.encryption,
            "Stored claims"
        );
        self.audit_success(AuditEventType::RecordStored, user, &record);
        Ok(record)
    }

    /// Read and decrypt a claims record.
    pub fn read_claims(
        &self,
        user: &AuthenticatedUser,
        claims_id: &str,
    ) -> VaultResult<Opened<ClaimsRecord>> {
        let record = Repository::<ClaimsRecord>::new(&self.storage).get(claims_id)?;
        self.authorize(user, &record)?;

        let plaintext = self.reveal(user, &record, &record.user_id)?;
        self.audit_success(AuditEventType::RecordRead, user, &record);
        Ok(Opened { record, plaintext })
    }

    /// Replace the claims blob of an existing record.
    ///
    /// The new value is written with the current mode, so updating a
    /// plaintext record with a master key configured encrypts it.
    pub fn update_claims(
        &self,
        user: &AuthenticatedUser,
        claims_id: &str,
        claims: &str,
    ) -> VaultResult<ClaimsRecord> {
        let repo = Repository::<ClaimsRecord>::new(&self.storage);
        let mut record = repo.get(claims_id)?;
        self.authorize(user, &record)?;

        let sealed = self.seal(RecordKind::Claims, &record.user_id, claims)?;
        record.set_payload(sealed);
        repo.update(&record)?;

        self.audit_success(AuditEventType::RecordUpdated, user, &record);
        Ok(record)
    }

    pub fn delete_claims(&self, user: &AuthenticatedUser, claims_id: &str) -> VaultResult<()> {
        let repo = Repository::<ClaimsRecord>::new(&self.storage);
        let record = repo.get(claims_id)?;
        self.authorize(user, &record)?;

        repo.delete(claims_id)?;
        self.audit_success(AuditEventType::RecordDeleted, user, &record);
        Ok(())
    }

    /// All of the caller's claims, decrypted.
    ///
    /// Records that fail to decrypt are skipped (and audited) so one bad
    /// record does not hide the rest.
    pub fn list_claims(&self, user: &AuthenticatedUser) -> VaultResult<Vec<Opened<ClaimsRecord>>> {
        let records = Repository::<ClaimsRecord>::new(&self.storage).list_by_owner(&user.user_id)?;

        Ok(records
            .into_iter()
            .filter_map(|record| {
                let plaintext = self.reveal(user, &record, &record.user_id).ok()?;
                Some(Opened { record, plaintext })
            })
            .collect())
    }
}
