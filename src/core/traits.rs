//! Core traits for record persistence
//!
//! The document database is an external collaborator; this module defines
//! the interface the rest of the crate talks to, so the in-memory store and
//! a real database driver can be used interchangeably.

use crate::types::{Faculty, Record, RecordError, RecordPatch, StudentStatus};

/// Search criteria for [`RecordStore::find`]
///
/// Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    /// Exact identifier
    pub id: Option<String>,
    /// Case-insensitive substring of the full name
    pub name: Option<String>,
    pub faculty: Option<Faculty>,
    pub status: Option<StudentStatus>,
}

impl RecordQuery {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_faculty(mut self, faculty: Faculty) -> Self {
        self.faculty = Some(faculty);
        self
    }

    pub fn with_status(mut self, status: StudentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        if let Some(id) = &self.id {
            if &record.id != id {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if !record
                .full_name
                .to_lowercase()
                .contains(&name.trim().to_lowercase())
            {
                return false;
            }
        }
        if let Some(faculty) = self.faculty {
            if record.faculty != faculty {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        true
    }
}

/// Persistence of student records
///
/// Writes are atomic per record; there are no cross-record transactions.
/// Implementations stamp `created_at`/`updated_at` themselves.
pub trait RecordStore: Send + Sync {
    /// Records matching `query`, ordered by identifier
    fn find(&self, query: &RecordQuery) -> Vec<Record>;

    /// Record with this identifier, if any
    fn get(&self, id: &str) -> Option<Record>;

    /// Insert a new record
    ///
    /// Fails with `DuplicateKey` if the identifier or email is taken.
    fn create(&self, record: Record) -> Result<Record, RecordError>;

    /// Apply a patch to an existing record once `check` accepts its current
    /// state
    ///
    /// `check` runs while the record is locked; its error is returned as is
    /// and nothing is written. Fails with `NotFound`, or `DuplicateKey` if
    /// the new email is taken.
    fn update_checked(
        &self,
        id: &str,
        patch: &RecordPatch,
        check: &dyn Fn(&Record) -> Result<(), RecordError>,
    ) -> Result<Record, RecordError>;

    /// Apply a patch to an existing record
    fn update(&self, id: &str, patch: &RecordPatch) -> Result<Record, RecordError> {
        self.update_checked(id, patch, &|_: &Record| Ok(()))
    }

    /// Remove a record
    fn delete(&self, id: &str) -> Result<(), RecordError>;

    /// Every record, ordered by identifier
    fn all(&self) -> Vec<Record> {
        self.find(&RecordQuery::default())
    }
}
