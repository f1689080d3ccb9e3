// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Filesystem operations for record storage.
//!
//! Records are plain JSON files. Payload confidentiality comes from the
//! field-level encryption in [`crate::crypto`], not from this layer: the
//! files hold the mode tag and the (possibly encrypted) payload string
//! exactly as the encryption service produced them.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

use super::StoragePaths;

/// Error type for record storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations
    Io(io::Error),
    /// JSON serialization/deserialization error
    Json(serde_json::Error),
    /// Record not found
    NotFound(String),
    /// Record already exists
    AlreadyExists(String),
    /// Record id not usable as a file name
    InvalidId(String),
    /// Storage not initialized
    NotInitialized,
    /// Stored data did not read back as written
    Corrupted(String),
    /// Ownership check failed
    PermissionDenied { user_id: String, resource: String },
    /// Generic serialization error
    SerializationError(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Json(e) => write!(f, "JSON error: {e}"),
            StorageError::NotFound(entity) => write!(f, "Not found: {entity}"),
            StorageError::AlreadyExists(entity) => write!(f, "Already exists: {entity}"),
            StorageError::InvalidId(id) => write!(f, "Invalid record id: {id:?}"),
            StorageError::NotInitialized => write!(f, "Storage not initialized"),
            StorageError::Corrupted(msg) => write!(f, "Corrupted data: {msg}"),
            StorageError::PermissionDenied { user_id, resource } => {
                write!(f, "Permission denied: user {user_id} cannot access {resource}")
            }
            StorageError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound(e.to_string())
        } else {
            StorageError::Io(e)
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Json(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// JSON-file storage rooted at the configured data directory.
#[derive(Debug, Clone)]
pub struct RecordStorage {
    paths: StoragePaths,
    initialized: bool,
}

impl RecordStorage {
    /// Create a new RecordStorage instance.
    ///
    /// Does NOT create the directory structure. Call `initialize()` first.
    pub fn new(paths: StoragePaths) -> Self {
        Self {
            paths,
            initialized: false,
        }
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Create all record and audit directories. Idempotent.
    pub fn initialize(&mut self) -> StorageResult<()> {
        for dir in self.paths.all_dirs() {
            fs::create_dir_all(&dir)?;
        }

        self.initialized = true;
        Ok(())
    }

    /// Write, read back and delete a marker file in the data directory.
    pub fn health_check(&self) -> StorageResult<()> {
        self.ensure_initialized()?;

        let test_file = self.paths.root().join(".health_check");
        let test_data = b"health_check_data";

        fs::write(&test_file, test_data)?;
        let read_data = fs::read(&test_file)?;
        fs::remove_file(&test_file)?;

        if read_data != test_data {
            return Err(StorageError::Corrupted(
                "Health check data mismatch".to_string(),
            ));
        }

        Ok(())
    }

    // ========== Generic JSON Operations ==========

    /// Read a JSON file and deserialize it.
    pub fn read_json<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> StorageResult<T> {
        self.ensure_initialized()?;

        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let value = serde_json::from_reader(reader)?;
        Ok(value)
    }

    /// Write a JSON file (atomic write via rename).
    ///
    /// Each call writes to its own temp file in the target directory, so
    /// concurrent writers to one record never share a partial file. Readers
    /// see either the old or the new contents.
    pub fn write_json<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> StorageResult<()> {
        self.ensure_initialized()?;

        let path = path.as_ref();
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let mut temp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }

        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref().is_file()
    }

    /// Delete a file.
    pub fn delete(&self, path: impl AsRef<Path>) -> StorageResult<()> {
        self.ensure_initialized()?;
        fs::remove_file(path.as_ref())?;
        Ok(())
    }

    /// List file stems in `dir` with the given extension.
    ///
    /// A missing directory yields an empty list. Results are sorted so that
    /// listings are stable across platforms.
    pub fn list_files(&self, dir: impl AsRef<Path>, extension: &str) -> StorageResult<Vec<String>> {
        self.ensure_initialized()?;

        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != extension) {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    // ========== Raw File Operations (audit JSONL) ==========

    /// Write raw bytes to a file, replacing its contents.
    pub fn write_raw(&self, path: impl AsRef<Path>, data: &[u8]) -> StorageResult<()> {
        self.ensure_initialized()?;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.write_all(data)?;
        file.flush()?;
        Ok(())
    }

    /// Append raw bytes to a file, creating it if needed.
    pub fn append_raw(&self, path: impl AsRef<Path>, data: &[u8]) -> StorageResult<()> {
        self.ensure_initialized()?;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(data)?;
        file.flush()?;
        Ok(())
    }

    /// Read raw bytes from a file.
    pub fn read_raw(&self, path: impl AsRef<Path>) -> StorageResult<Vec<u8>> {
        self.ensure_initialized()?;

        let mut file = File::open(path.as_ref())?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    fn ensure_initialized(&self) -> StorageResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(StorageError::NotInitialized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RecordKind;
    use serde::Deserialize;
    use tempfile::TempDir;

    fn setup() -> (TempDir, RecordStorage) {
        let temp = TempDir::new().unwrap();
        let mut storage = RecordStorage::new(StoragePaths::new(temp.path()));
        storage.initialize().expect("Failed to initialize test storage");
        (temp, storage)
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestData {
        id: String,
        value: i32,
    }

    #[test]
    fn initialize_creates_directories() {
        let (_temp, storage) = setup();

        for kind in RecordKind::ALL {
            assert!(storage.paths().kind_dir(kind).is_dir());
        }
        assert!(storage.paths().audit_dir().is_dir());
    }

    #[test]
    fn write_and_read_json() {
        let (_temp, storage) = setup();
        let data = TestData {
            id: "test-1".to_string(),
            value: 42,
        };

        let path = storage.paths().record(RecordKind::Claims, "test-1");
        storage.write_json(&path, &data).unwrap();

        let read: TestData = storage.read_json(&path).unwrap();
        assert_eq!(read, data);

        // No temp file left behind next to the record.
        let entries: Vec<_> = fs::read_dir(storage.paths().kind_dir(RecordKind::Claims))
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("test-1.json")]);
    }

    #[test]
    fn concurrent_writes_to_one_record_stay_readable() {
        let (_temp, storage) = setup();
        let path = storage.paths().record(RecordKind::Claims, "shared");
        storage
            .write_json(&path, &TestData { id: "shared".to_string(), value: -1 })
            .unwrap();

        std::thread::scope(|scope| {
            for writer in 0..8 {
                let storage = &storage;
                let path = &path;
                scope.spawn(move || {
                    for round in 0..30 {
                        let data = TestData {
                            id: "shared".to_string(),
                            value: writer * 100 + round,
                        };
                        storage.write_json(path, &data).unwrap();
                        let read: TestData = storage.read_json(path).unwrap();
                        assert_eq!(read.id, "shared");
                    }
                });
            }
        });

        let last: TestData = storage.read_json(&path).unwrap();
        assert!(last.value >= 0);
        assert_eq!(
            storage
                .list_files(storage.paths().kind_dir(RecordKind::Claims), "json")
                .unwrap(),
            vec!["shared".to_string()]
        );
    }

    #[test]
    fn append_and_read_raw() {
        let (_temp, storage) = setup();
        let path = storage.paths().audit_events_file("2026-01-01");

        storage.append_raw(&path, b"line one\n").unwrap();
        storage.append_raw(&path, b"line two\n").unwrap();

        let read = storage.read_raw(&path).unwrap();
        assert_eq!(read, b"line one\nline two\n");

        storage.write_raw(&path, b"replaced").unwrap();
        assert_eq!(storage.read_raw(&path).unwrap(), b"replaced");
    }

    #[test]
    fn health_check_works() {
        let (_temp, storage) = setup();
        storage.health_check().expect("Health check should pass");
    }

    #[test]
    fn list_files_returns_sorted_ids() {
        let (_temp, storage) = setup();
        let dir = storage.paths().kind_dir(RecordKind::Document);

        for i in [3, 1, 2] {
            let path = storage.paths().record(RecordKind::Document, &format!("doc-{i}"));
            storage
                .write_json(&path, &TestData {
                    id: format!("doc-{i}"),
                    value: i,
                })
                .unwrap();
        }
        storage.write_raw(dir.join("notes.txt"), b"ignored").unwrap();

        let ids = storage.list_files(&dir, "json").unwrap();
        assert_eq!(ids, vec!["doc-1", "doc-2", "doc-3"]);
    }

    #[test]
    fn list_files_on_missing_dir_is_empty() {
        let (temp, storage) = setup();
        let ids = storage.list_files(temp.path().join("nope"), "json").unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn delete_file_removes_it() {
        let (_temp, storage) = setup();
        let path = storage.paths().record(RecordKind::Photo, "to-delete");
        storage
            .write_json(&path, &TestData {
                id: "del".to_string(),
                value: 0,
            })
            .unwrap();

        assert!(storage.exists(&path));
        storage.delete(&path).unwrap();
        assert!(!storage.exists(&path));
    }

    #[test]
    fn missing_file_maps_to_not_found() {
        let (_temp, storage) = setup();
        let path = storage.paths().record(RecordKind::Claims, "missing");
        let result = storage.read_json::<TestData>(&path);
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn uninitialized_storage_returns_error() {
        let storage = RecordStorage::new(StoragePaths::new("/tmp/never-init"));

        assert!(!storage.is_initialized());
        let result = storage.read_json::<TestData>("/tmp/any.json");
        assert!(matches!(result, Err(StorageError::NotInitialized)));
    }
}
