//! Thread-safe in-memory record store
//!
//! `MemoryRecordStore` stands in for the document database. It keeps two
//! `DashMap`s: identifier → record, and normalized email → identifier for
//! the email uniqueness index. DashMap's sharded locking lets imports touch
//! different records concurrently while writes to one record stay atomic.
//!
//! # Lock ordering
//!
//! `update_checked` holds a record entry while it runs the caller's check
//! and touches the email index; nothing holds an email entry while touching
//! the records map, so the two maps can never deadlock each other.

use crate::core::traits::{RecordQuery, RecordStore};
use crate::types::{Record, RecordError, RecordId, RecordPatch};
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// In-memory store backed by DashMap
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: DashMap<RecordId, Record>,
    emails: DashMap<String, RecordId>,
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `records`
    ///
    /// # Errors
    ///
    /// `DuplicateKey` on the first colliding identifier or email.
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Result<Self, RecordError> {
        let store = Self::new();
        for record in records {
            store.create(record)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Claim `email` for `id`; fails if another record holds it
    ///
    /// Returns `true` when this call added the index entry.
    fn reserve_email(&self, email: &str, id: &str) -> Result<bool, RecordError> {
        match self.emails.entry(email_key(email)) {
            Entry::Occupied(entry) if entry.get() != id => {
                Err(RecordError::duplicate_key("email", email))
            }
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                entry.insert(id.to_string());
                Ok(true)
            }
        }
    }

    /// Drop the index entry for `email` if it still points at `id`
    fn release_email(&self, email: &str, id: &str) {
        self.emails
            .remove_if(&email_key(email), |_, owner| owner == id);
    }
}

impl RecordStore for MemoryRecordStore {
    fn find(&self, query: &RecordQuery) -> Vec<Record> {
        let mut found: Vec<Record> = match &query.id {
            Some(id) => self
                .records
                .get(id)
                .map(|entry| entry.value().clone())
                .into_iter()
                .filter(|record| query.matches(record))
                .collect(),
            None => self
                .records
                .iter()
                .filter(|entry| query.matches(entry.value()))
                .map(|entry| entry.value().clone())
                .collect(),
        };
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }

    fn get(&self, id: &str) -> Option<Record> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    fn create(&self, mut record: Record) -> Result<Record, RecordError> {
        if self.records.contains_key(&record.id) {
            return Err(RecordError::duplicate_key("id", &record.id));
        }

        let reserved = self.reserve_email(&record.email, &record.id)?;

        let now = Utc::now();
        record.created_at = now;
        record.updated_at = now;

        match self.records.entry(record.id.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(record.clone());
                Ok(record)
            }
            // Lost a race with another create of the same id
            Entry::Occupied(entry) => {
                drop(entry);
                if reserved {
                    self.release_email(&record.email, &record.id);
                }
                Err(RecordError::duplicate_key("id", &record.id))
            }
        }
    }

    fn update_checked(
        &self,
        id: &str,
        patch: &RecordPatch,
        check: &dyn Fn(&Record) -> Result<(), RecordError>,
    ) -> Result<Record, RecordError> {
        let mut entry = self
            .records
            .get_mut(id)
            .ok_or_else(|| RecordError::not_found(id))?;
        let record = entry.value_mut();
        check(record)?;

        if let Some(email) = &patch.email {
            if email_key(email) != email_key(&record.email) {
                self.reserve_email(email, id)?;
                self.release_email(&record.email, id);
            }
        }

        patch.apply(record);
        record.updated_at = Utc::now();

        Ok(record.clone())
    }

    fn delete(&self, id: &str) -> Result<(), RecordError> {
        let (_, record) = self
            .records
            .remove(id)
            .ok_or_else(|| RecordError::not_found(id))?;
        self.release_email(&record.email, id);
        Ok(())
    }
}
