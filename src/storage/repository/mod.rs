// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to record storage.
//!
//! All four record kinds share the same shape: an id, an owner, a payload
//! string and the mode tag that says how to read that payload. The generic
//! [`Repository`] provides CRUD over any [`StoredRecord`]; the per-kind
//! modules add their own queries.

pub mod attachments;
pub mod claims;
pub mod documents;
pub mod photos;

use serde::{de::DeserializeOwned, Serialize};

use super::paths::is_valid_record_id;
use super::{OwnedResource, RecordKind, RecordStorage, StorageError, StorageResult};
use crate::crypto::ProtectedValue;

pub use attachments::AttachmentRecord;
pub use claims::ClaimsRecord;
pub use documents::DocumentRecord;
pub use photos::PhotoRecord;

/// A persisted record carrying one protected payload field.
pub trait StoredRecord: Serialize + DeserializeOwned + OwnedResource {
    const KIND: RecordKind;

    fn id(&self) -> &str;

    /// The payload together with its stored mode tag.
    fn payload(&self) -> ProtectedValue;

    /// Replace the payload and its mode tag.
    fn set_payload(&mut self, value: ProtectedValue);
}

/// CRUD operations for one record kind.
pub struct Repository<'a, R> {
    storage: &'a RecordStorage,
    _kind: std::marker::PhantomData<R>,
}

impl<'a, R: StoredRecord> Repository<'a, R> {
    pub fn new(storage: &'a RecordStorage) -> Self {
        Self {
            storage,
            _kind: std::marker::PhantomData,
        }
    }

    /// Check if a record exists. Invalid ids never exist.
    pub fn exists(&self, id: &str) -> bool {
        is_valid_record_id(id) && self.storage.exists(self.storage.paths().record(R::KIND, id))
    }

    /// Get a record by ID.
    pub fn get(&self, id: &str) -> StorageResult<R> {
        let path = self.record_path(id)?;
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("{} {id}", R::KIND)));
        }
        self.storage.read_json(path)
    }

    /// Create a new record.
    pub fn create(&self, record: &R) -> StorageResult<()> {
        let id = record.id();
        let path = self.record_path(id)?;
        if self.storage.exists(&path) {
            return Err(StorageError::AlreadyExists(format!("{} {id}", R::KIND)));
        }
        self.storage.write_json(path, record)
    }

    /// Replace an existing record.
    pub fn update(&self, record: &R) -> StorageResult<()> {
        let id = record.id();
        let path = self.record_path(id)?;
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("{} {id}", R::KIND)));
        }
        self.storage.write_json(path, record)
    }

    /// Delete a record.
    pub fn delete(&self, id: &str) -> StorageResult<()> {
        let path = self.record_path(id)?;
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("{} {id}", R::KIND)));
        }
        self.storage.delete(path)
    }

    fn record_path(&self, id: &str) -> StorageResult<std::path::PathBuf> {
        if !is_valid_record_id(id) {
            return Err(StorageError::InvalidId(id.to_string()));
        }
        Ok(self.storage.paths().record(R::KIND, id))
    }

    /// List every record of this kind (admin and maintenance use).
    ///
    /// Files that fail to load are logged and skipped so one bad record
    /// does not hide the rest.
    pub fn list_all(&self) -> StorageResult<Vec<R>> {
        self.list_where(|_| true)
    }

    /// List all records owned by a user.
    pub fn list_by_owner(&self, owner_user_id: &str) -> StorageResult<Vec<R>> {
        self.list_where(|record| record.owner_user_id() == owner_user_id)
    }

    /// List records matching `predicate`.
    pub fn list_where<F>(&self, predicate: F) -> StorageResult<Vec<R>>
    where
        F: Fn(&R) -> bool,
    {
        let ids = self
            .storage
            .list_files(self.storage.paths().kind_dir(R::KIND), "json")?;

        let kind = R::KIND;
        let mut records = Vec::new();
        for id in ids {
            match self.get(&id) {
                Ok(record) if predicate(&record) => records.push(record),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(kind = %kind, record_id = %id, error = %e, "Skipping unreadable record");
                }
            }
        }
        Ok(records)
    }
}
