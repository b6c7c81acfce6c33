//! In-memory row store
//!
//! Reference implementation of `RevisionStore` backed by a `HashMap`. Rows
//! are held unordered; the fetch path sorts, so the ordering contract lives
//! in exactly one place.

use std::collections::HashMap;

use super::errors::{StoreError, StoreResult};
use super::RevisionStore;
use crate::model::{RecordId, TitleId, VersionRevision};

/// In-memory `RevisionStore` implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: HashMap<RecordId, VersionRevision>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Total row count across all titles
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the store holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up a single row by id
    pub fn get(&self, record_id: RecordId) -> Option<&VersionRevision> {
        self.rows.get(&record_id)
    }
}

impl RevisionStore for MemoryStore {
    fn fetch_for_title(&self, title_id: TitleId) -> StoreResult<Vec<VersionRevision>> {
        let mut rows: Vec<VersionRevision> = self
            .rows
            .values()
            .filter(|r| r.title_id == title_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.version
                .cmp(&a.version)
                .then_with(|| a.revision.cmp(&b.revision))
        });
        Ok(rows)
    }

    fn insert(&mut self, record: &VersionRevision) -> StoreResult<()> {
        if self.rows.contains_key(&record.record_id) {
            return Err(StoreError::DuplicateRecord(record.record_id));
        }
        self.rows.insert(record.record_id, record.clone());
        Ok(())
    }

    fn update_batch(&mut self, records: &[VersionRevision]) -> StoreResult<()> {
        // Validate the whole batch before touching anything
        for record in records {
            if !self.rows.contains_key(&record.record_id) {
                return Err(StoreError::NotFound(record.record_id));
            }
        }
        for record in records {
            self.rows.insert(record.record_id, record.clone());
        }
        Ok(())
    }

    fn delete(&mut self, record_id: RecordId) -> StoreResult<()> {
        match self.rows.remove(&record_id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(record_id)),
        }
    }
}
