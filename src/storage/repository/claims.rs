// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claims records.
//!
//! A claims record holds one user's claims blob (usually JSON) in its
//! `claims` field. Each record is stored as a separate JSON file under
//! `/data/claims/`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StoredRecord;
use crate::crypto::{EncryptionMode, ProtectedValue};
use crate::storage::{OwnedResource, RecordKind};

/// Claims blob stored on the filesystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimsRecord {
    /// Unique record identifier
    pub id: String,
    /// Owner user ID; also the key derivation input
    pub user_id: String,
    /// How `claims` is stored
    #[serde(default)]
    pub encryption: EncryptionMode,
    /// Plaintext claims or a base64 envelope, per `encryption`
    pub claims: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClaimsRecord {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, claims: ProtectedValue) -> Self {
        let now = Utc::now();
        let (encryption, claims) = claims.into_stored();
        Self {
            id: id.into(),
            user_id: user_id.into(),
            encryption,
            claims,
            created_at: now,
            updated_at: now,
        }
    }
}

impl OwnedResource for ClaimsRecord {
    fn owner_user_id(&self) -> &str {
        &self.user_id
    }

    fn resource_label(&self) -> String {
        format!("claims {}", self.id)
    }
}

impl StoredRecord for ClaimsRecord {
    const KIND: RecordKind = RecordKind::Claims;

    fn id(&self) -> &str {
        &self.id
    }

    fn payload(&self) -> ProtectedValue {
        ProtectedValue::from_stored(self.encryption, self.claims.clone())
    }

    fn set_payload(&mut self, value: ProtectedValue) {
        let (encryption, claims) = value.into_stored();
        self.encryption = encryption;
        self.claims = claims;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_splits_protected_value() {
        let record = ClaimsRecord::new(
            "c-1",
            "alice",
            ProtectedValue::Encrypted("ZW52ZWxvcGU=".to_string()),
        );
        assert_eq!(record.encryption, EncryptionMode::AesHmac);
        assert_eq!(record.claims, "ZW52ZWxvcGU=");
        assert_eq!(
            record.payload(),
            ProtectedValue::Encrypted("ZW52ZWxvcGU=".to_string())
        );
    }

    #[test]
    fn serialized_mode_tag() {
        let record = ClaimsRecord::new("c-1", "alice", ProtectedValue::Plaintext("{}".to_string()));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["encryption"], "NO_ENCRYPTION");
        assert_eq!(json["claims"], "{}");
    }

    #[test]
    fn untagged_record_reads_as_plaintext() {
        let json = r#"{
            "id": "c-legacy",
            "user_id": "alice",
            "claims": "{\"role\":\"member\"}",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }"#;
        let record: ClaimsRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.encryption, EncryptionMode::NoEncryption);
        assert_eq!(
            record.payload(),
            ProtectedValue::Plaintext("{\"role\":\"member\"}".to_string())
        );
    }

    #[test]
    fn resource_label_names_record() {
        let record = ClaimsRecord::new("c-9", "alice", ProtectedValue::Plaintext(String::new()));
        assert_eq!(record.resource_label(), "claims c-9");
        assert_eq!(record.owner_user_id(), "alice");
    }
}
