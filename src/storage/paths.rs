// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the record storage layout.

use std::path::{Path, PathBuf};

use super::RecordKind;

/// Default base directory for all persistent storage.
pub const DATA_ROOT: &str = "/data";

/// Whether `record_id` is safe to use as a file stem.
///
/// Ids are restricted to ASCII letters, digits, `-`, `_` and `.`, and may
/// not start with `.` or contain `..`, so an id can never leave its kind's
/// directory.
pub fn is_valid_record_id(record_id: &str) -> bool {
    !record_id.is_empty()
        && !record_id.starts_with('.')
        && !record_id.contains("..")
        && record_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Storage path utilities.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== Record Paths ==========

    /// Directory holding every record of one kind.
    pub fn kind_dir(&self, kind: RecordKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Path to a single record file.
    pub fn record(&self, kind: RecordKind, record_id: &str) -> PathBuf {
        self.kind_dir(kind).join(format!("{record_id}.json"))
    }

    // ========== Audit Paths ==========

    /// Directory containing audit logs.
    pub fn audit_dir(&self) -> PathBuf {
        self.root.join("audit")
    }

    /// Directory for a specific day's audit logs.
    pub fn audit_date_dir(&self, date: &str) -> PathBuf {
        self.audit_dir().join(date)
    }

    /// Path to a day's audit events file (JSONL).
    pub fn audit_events_file(&self, date: &str) -> PathBuf {
        self.audit_date_dir(date).join("events.jsonl")
    }

    /// Every directory `RecordStorage::initialize` creates.
    pub fn all_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = RecordKind::ALL
            .iter()
            .map(|kind| self.kind_dir(*kind))
            .collect();
        dirs.push(self.audit_dir());
        dirs
    }
}
