//! Shared helpers for the engine test suites

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};

use folio::model::{RecordId, Revision, TitleId, VersionRevision};
use folio::store::{MemoryStore, RevisionStore, StoreError, StoreResult};

/// Inserts one row at an explicit position. File names double as stable
/// identities in assertions.
pub fn insert_at(
    store: &mut MemoryStore,
    title: TitleId,
    version: u32,
    letter: char,
    file_name: &str,
) -> RecordId {
    let record = VersionRevision::new(title, version, Revision::from_letter(letter), file_name);
    let record_id = record.record_id;
    store.insert(&record).unwrap();
    record_id
}

/// Seeds a title with dense numbering: `revision_counts[i]` revisions for
/// version `i + 1`, file names `"{version}{letter}.docx"`.
pub fn seed_title(store: &mut MemoryStore, title: TitleId, revision_counts: &[usize]) {
    for (i, &count) in revision_counts.iter().enumerate() {
        let version = i as u32 + 1;
        for j in 0..count {
            let letter = (b'A' + j as u8) as char;
            insert_at(
                store,
                title,
                version,
                letter,
                &format!("{}{}.docx", version, letter),
            );
        }
    }
}

/// Looks up a record by file name
pub fn by_name<'a>(records: &'a [VersionRevision], file_name: &str) -> &'a VersionRevision {
    records
        .iter()
        .find(|r| r.file_name == file_name)
        .unwrap_or_else(|| panic!("no record named {}", file_name))
}

/// Compact `(version, letter)` view of a snapshot, in snapshot order
pub fn positions(records: &[VersionRevision]) -> Vec<(u32, char)> {
    records
        .iter()
        .map(|r| (r.version, r.revision.code() as char))
        .collect()
}

/// Asserts the density and uniqueness invariants: versions contiguous from
/// 1, revisions contiguous from `A` within every version, no position held
/// twice.
pub fn assert_dense(records: &[VersionRevision]) {
    let mut groups: BTreeMap<u32, Vec<u8>> = BTreeMap::new();
    let mut seen = HashSet::new();
    for record in records {
        assert!(
            seen.insert((record.version, record.revision.code())),
            "position ({}, {}) held twice",
            record.version,
            record.revision
        );
        groups
            .entry(record.version)
            .or_default()
            .push(record.revision.code());
    }
    for (i, (version, codes)) in groups.iter_mut().enumerate() {
        assert_eq!(
            *version,
            i as u32 + 1,
            "version numbers must be contiguous from 1"
        );
        codes.sort_unstable();
        for (j, code) in codes.iter().enumerate() {
            assert_eq!(
                *code,
                b'A' + j as u8,
                "revisions of version {} must be contiguous from A",
                version
            );
        }
    }
}

/// Store wrapper that injects write failures, for failure-propagation tests
#[derive(Debug, Default)]
pub struct FailingStore {
    pub inner: MemoryStore,
    pub fail_insert: bool,
    pub fail_update: bool,
    pub fail_delete: bool,
}

impl FailingStore {
    pub fn wrapping(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }
}

impl RevisionStore for FailingStore {
    fn fetch_for_title(&self, title_id: TitleId) -> StoreResult<Vec<VersionRevision>> {
        self.inner.fetch_for_title(title_id)
    }

    fn insert(&mut self, record: &VersionRevision) -> StoreResult<()> {
        if self.fail_insert {
            return Err(StoreError::Backend("injected insert failure".to_string()));
        }
        self.inner.insert(record)
    }

    fn update_batch(&mut self, records: &[VersionRevision]) -> StoreResult<()> {
        if self.fail_update {
            return Err(StoreError::Backend("injected update failure".to_string()));
        }
        self.inner.update_batch(records)
    }

    fn delete(&mut self, record_id: RecordId) -> StoreResult<()> {
        if self.fail_delete {
            return Err(StoreError::Backend("injected delete failure".to_string()));
        }
        self.inner.delete(record_id)
    }
}
