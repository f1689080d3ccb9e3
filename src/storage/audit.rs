// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit logging for record access.
//!
//! Every successful store, read, update and delete is recorded, as are
//! denied accesses and decryption failures. Entries never contain payloads
//! or key material.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{RecordStorage, StorageError, StorageResult};

/// Types of auditable events.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // Record events
    RecordStored,
    RecordRead,
    RecordUpdated,
    RecordDeleted,

    // Crypto events
    DecryptionFailed,
    RecordsResealed,

    // Access events
    PermissionDenied,
    AuditAccessed,
}

/// An audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID.
    pub event_id: String,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Type of event.
    pub event_type: AuditEventType,
    /// User who triggered the event (if known).
    pub user_id: Option<String>,
    /// Record affected.
    pub resource_id: Option<String>,
    /// Record kind (claims, document, photo, attachment).
    pub resource_type: Option<String>,
    /// Additional details as JSON (mode tags, counts, error codes).
    pub details: Option<serde_json::Value>,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error message if operation failed.
    pub error: Option<String>,
}

impl AuditEvent {
    /// Create a new audit event.
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type,
            user_id: None,
            resource_id: None,
            resource_type: None,
            details: None,
            success: true,
            error: None,
        }
    }

    /// Set the user ID.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set the resource.
    pub fn with_resource(
        mut self,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Add details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Mark as failed with error message.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }
}

/// Repository for audit events.
pub struct AuditRepository<'a> {
    storage: &'a RecordStorage,
}

impl<'a> AuditRepository<'a> {
    pub fn new(storage: &'a RecordStorage) -> Self {
        Self { storage }
    }

    /// Append an event to the daily JSONL log.
    pub fn log(&self, event: &AuditEvent) -> StorageResult<()> {
        let date = event.timestamp.format("%Y-%m-%d").to_string();
        let path = self.storage.paths().audit_events_file(&date);

        let mut line = serde_json::to_vec(event).map_err(|e| {
            StorageError::SerializationError(format!("Failed to serialize audit event: {e}"))
        })?;
        line.push(b'\n');

        self.storage.append_raw(&path, &line)
    }

    /// Read audit events for a specific date (`YYYY-MM-DD`).
    pub fn read_events(&self, date: &str) -> StorageResult<Vec<AuditEvent>> {
        let date = parse_date(date, "audit")?.format("%Y-%m-%d").to_string();
        let path = self.storage.paths().audit_events_file(&date);
        let content = self.storage.read_raw(&path)?;

        let content = String::from_utf8(content).map_err(|e| {
            StorageError::SerializationError(format!("Invalid UTF-8 in audit log: {e}"))
        })?;

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| {
                    StorageError::SerializationError(format!(
                        "Failed to deserialize audit event: {e}"
                    ))
                })
            })
            .collect()
    }

    /// Read events for an inclusive date range. Days without a log are skipped.
    pub fn read_events_range(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> StorageResult<Vec<AuditEvent>> {
        let start = parse_date(start_date, "start")?;
        let end = parse_date(end_date, "end")?;

        let mut all_events = Vec::new();
        let mut current = start;

        while current <= end {
            let date_str = current.format("%Y-%m-%d").to_string();
            match self.read_events(&date_str) {
                Ok(events) => all_events.extend(events),
                Err(StorageError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
            current = current
                .succ_opt()
                .ok_or_else(|| StorageError::SerializationError("Date overflow".to_string()))?;
        }

        Ok(all_events)
    }

    /// Events triggered by one user on a given date.
    pub fn search_by_user(&self, user_id: &str, date: &str) -> StorageResult<Vec<AuditEvent>> {
        let events = self.read_events(date)?;
        Ok(events
            .into_iter()
            .filter(|e| e.user_id.as_deref() == Some(user_id))
            .collect())
    }

    /// Events touching one record on a given date.
    pub fn search_by_resource(
        &self,
        resource_type: &str,
        resource_id: &str,
        date: &str,
    ) -> StorageResult<Vec<AuditEvent>> {
        let events = self.read_events(date)?;
        Ok(events
            .into_iter()
            .filter(|e| {
                e.resource_type.as_deref() == Some(resource_type)
                    && e.resource_id.as_deref() == Some(resource_id)
            })
            .collect())
    }
}

fn parse_date(date: &str, which: &str) -> StorageResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| StorageError::SerializationError(format!("Invalid {which} date: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn setup() -> (TempDir, RecordStorage) {
        let temp = TempDir::new().unwrap();
        let mut storage = RecordStorage::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        (temp, storage)
    }

    fn today() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }

    #[test]
    fn create_audit_event() {
        let event = AuditEvent::new(AuditEventType::RecordStored)
            .with_user("user_123")
            .with_resource("claims", "c-1")
            .with_details(serde_json::json!({ "encryption": "AES_HMAC" }));

        assert_eq!(event.event_type, AuditEventType::RecordStored);
        assert_eq!(event.user_id.as_deref(), Some("user_123"));
        assert_eq!(event.resource_type.as_deref(), Some("claims"));
        assert_eq!(event.resource_id.as_deref(), Some("c-1"));
        assert!(event.success);
    }

    #[test]
    fn failed_event() {
        let event = AuditEvent::new(AuditEventType::PermissionDenied)
            .with_user("user_123")
            .failed("Not authorized");

        assert!(!event.success);
        assert_eq!(event.error.as_deref(), Some("Not authorized"));
    }

    #[test]
    fn event_type_serializes_snake_case() {
        let json = serde_json::to_string(&AuditEventType::DecryptionFailed).unwrap();
        assert_eq!(json, "\"decryption_failed\"");
    }

    #[test]
    fn log_and_read_events() {
        let (_temp, storage) = setup();
        let repo = AuditRepository::new(&storage);

        repo.log(
            &AuditEvent::new(AuditEventType::RecordStored)
                .with_user("user_1")
                .with_resource("document", "d1"),
        )
        .unwrap();
        repo.log(
            &AuditEvent::new(AuditEventType::RecordRead)
                .with_user("user_2")
                .with_resource("document", "d2"),
        )
        .unwrap();

        let events = repo.read_events(&today()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, AuditEventType::RecordStored);
        assert_eq!(events[1].event_type, AuditEventType::RecordRead);
    }

    #[test]
    fn read_range_skips_missing_days() {
        let (_temp, storage) = setup();
        let repo = AuditRepository::new(&storage);
        repo.log(&AuditEvent::new(AuditEventType::RecordStored).with_user("u"))
            .unwrap();

        let today = Utc::now().date_naive();
        let start = (today - chrono::Duration::days(3)).format("%Y-%m-%d").to_string();
        let end = today.format("%Y-%m-%d").to_string();

        let events = repo.read_events_range(&start, &end).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn read_range_rejects_bad_dates() {
        let (_temp, storage) = setup();
        let repo = AuditRepository::new(&storage);
        let result = repo.read_events_range("yesterday", "2026-01-01");
        assert!(matches!(result, Err(StorageError::SerializationError(_))));
    }

    #[test]
    fn read_events_rejects_path_like_dates() {
        let (_temp, storage) = setup();
        let repo = AuditRepository::new(&storage);
        for date in ["../claims", "2026-01-01/../../x", ""] {
            assert!(matches!(
                repo.read_events(date),
                Err(StorageError::SerializationError(_))
            ));
        }
    }

    #[test]
    fn search_by_user() {
        let (_temp, storage) = setup();
        let repo = AuditRepository::new(&storage);

        repo.log(&AuditEvent::new(AuditEventType::RecordStored).with_user("user_target"))
            .unwrap();
        repo.log(&AuditEvent::new(AuditEventType::RecordStored).with_user("user_other"))
            .unwrap();

        let events = repo.search_by_user("user_target", &today()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].user_id.as_deref(), Some("user_target"));
    }

    #[test]
    fn search_by_resource() {
        let (_temp, storage) = setup();
        let repo = AuditRepository::new(&storage);

        repo.log(
            &AuditEvent::new(AuditEventType::RecordStored)
                .with_user("user_1")
                .with_resource("photo", "target"),
        )
        .unwrap();
        repo.log(
            &AuditEvent::new(AuditEventType::RecordRead)
                .with_user("user_2")
                .with_resource("photo", "target"),
        )
        .unwrap();
        repo.log(
            &AuditEvent::new(AuditEventType::RecordStored)
                .with_user("user_1")
                .with_resource("attachment", "target"),
        )
        .unwrap();

        let events = repo.search_by_resource("photo", "target", &today()).unwrap();
        assert_eq!(events.len(), 2);
    }
}
