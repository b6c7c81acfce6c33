//! Version/revision renumbering engine
//!
//! Encapsulates all structural edits to a title's version/revision set: add,
//! remove, move up, move down, and convert-to-version. After every public
//! operation the numbering is dense again: versions run 1..N with no gaps and
//! each version's revisions run contiguously from `A`.
//!
//! # Lifecycle
//!
//! Engines are obtained through [`open_engine`] and hold a mutable borrow of
//! the row store for their whole lifetime; there is no process-wide engine
//! cache. Each mutation edits an owned snapshot of the title's rows, writes
//! back only the changed rows in one pass, then resynchronizes by re-reading
//! all rows ordered `version DESC, revision ASC`. On any error the instance
//! is stale and must be discarded.
//!
//! # Ordering
//!
//! The snapshot ordering is `version DESC, revision ASC` (3A, 3B, 2A, 2B,
//! 2C, 1A). "Previous" means one position closer to latest (lower index),
//! "next" one position closer to earliest (higher index).

mod errors;
mod version_map;

pub use errors::{EngineError, EngineResult};
pub use version_map::VersionMap;

use std::collections::HashMap;

use crate::model::{RecordId, Revision, TitleId, VersionRevision, REVISION_A};
use crate::observability::{Logger, Severity};
use crate::store::RevisionStore;

/// Position fields of a row, used to detect which rows a mutation changed
type Baseline = HashMap<RecordId, (u32, Revision)>;

/// Opens an engine for one title.
///
/// Reads the title's rows and builds the version map. Callers own the
/// instance and discard it after use or on error.
pub fn open_engine<S: RevisionStore>(
    title_id: TitleId,
    store: &mut S,
) -> EngineResult<RenumberEngine<'_, S>> {
    let mut engine = RenumberEngine {
        title_id,
        store,
        records: Vec::new(),
        map: VersionMap::default(),
    };
    engine.rebuild()?;
    Ok(engine)
}

/// Renumbering engine for a single title
pub struct RenumberEngine<'s, S: RevisionStore> {
    title_id: TitleId,
    store: &'s mut S,
    /// Owned snapshot of the title's rows, ordered `version DESC, revision ASC`
    records: Vec<VersionRevision>,
    /// Derived grouping of revision letters by version, rebuilt after every
    /// mutation
    map: VersionMap,
}

impl<'s, S: RevisionStore> RenumberEngine<'s, S> {
    /// The title this engine operates on
    pub fn title_id(&self) -> TitleId {
        self.title_id
    }

    /// The current snapshot, ordered `version DESC, revision ASC`
    pub fn records(&self) -> &[VersionRevision] {
        &self.records
    }

    /// The current version map
    pub fn version_map(&self) -> &VersionMap {
        &self.map
    }

    /// Creates a brand-new highest version `(version_count + 1, A)` with the
    /// given file name and default metadata.
    ///
    /// Never inserts into the middle. Fails with a validation error if
    /// `file_name` is empty.
    pub fn add(&mut self, file_name: &str) -> EngineResult<RecordId> {
        if file_name.trim().is_empty() {
            return Err(EngineError::validation("file name must not be empty"));
        }
        let version = self.map.version_count() as u32 + 1;
        let record = VersionRevision::new(self.title_id, version, REVISION_A, file_name);
        let record_id = record.record_id;
        self.store.insert(&record)?;
        self.rebuild()?;
        Ok(record_id)
    }

    /// Deletes a record, then renumbers all revisions of every version and
    /// all version numbers so the numbering is dense again.
    pub fn remove(&mut self, record_id: RecordId) -> EngineResult<()> {
        let pos = self.find(record_id)?;
        let baseline = self.baseline();
        let removed = self.records.remove(pos);
        self.store.delete(removed.record_id)?;
        self.renumber_revisions();
        self.renumber_versions();
        self.commit(&baseline)
    }

    /// Moves a record one position toward latest. No-op if the record is
    /// already the latest.
    ///
    /// Within a version the two adjacent records swap revision letters.
    /// Crossing a version boundary, the record leaves its version (the
    /// letters behind it close the gap) and becomes the new last revision of
    /// the previous record's version. If the vacated revision was `A`, a
    /// full version renumbering pass closes any version gap.
    pub fn move_up(&mut self, record_id: RecordId) -> EngineResult<()> {
        if self.is_latest(record_id)? {
            return Ok(());
        }
        let pos = self.find(record_id)?;
        if pos == 0 {
            return Err(self.raise(EngineError::consistency(
                format!(
                    "record {} heads the snapshot but is not latest",
                    record_id
                ),
                self.map.to_string(),
            )));
        }
        let baseline = self.baseline();
        let prev_version = self.records[pos - 1].version;
        let version = self.records[pos].version;
        if prev_version == version {
            let prev_revision = self.records[pos - 1].revision;
            let revision = self.records[pos].revision;
            self.records[pos - 1].revision = revision;
            self.records[pos].revision = prev_revision;
        } else {
            let original_revision = self.records[pos].revision;
            let target_revision = self
                .map
                .last_revision(prev_version)
                .map_err(|e| self.raise(e))?
                .succ();
            // Close the gap the record leaves in its old version
            for record in &mut self.records {
                if record.record_id != record_id
                    && record.version == version
                    && record.revision > original_revision
                {
                    record.revision = record.revision.pred();
                }
            }
            let record = &mut self.records[pos];
            record.version = prev_version;
            record.revision = target_revision;
            if original_revision == REVISION_A {
                self.renumber_versions();
            }
        }
        self.commit(&baseline)
    }

    /// Moves a record one position toward earliest. No-op if the record is
    /// already the earliest.
    ///
    /// Within a version the two adjacent records swap revision letters.
    /// Crossing a version boundary, every revision of the next record's
    /// version shifts up one letter to make room and the record becomes that
    /// version's `A`. If the vacated revision was `A`, a full version
    /// renumbering pass closes any version gap.
    pub fn move_down(&mut self, record_id: RecordId) -> EngineResult<()> {
        if self.is_earliest(record_id)? {
            return Ok(());
        }
        let pos = self.find(record_id)?;
        if pos + 1 >= self.records.len() {
            return Err(self.raise(EngineError::consistency(
                format!(
                    "record {} tails the snapshot but is not earliest",
                    record_id
                ),
                self.map.to_string(),
            )));
        }
        let baseline = self.baseline();
        let next_version = self.records[pos + 1].version;
        let version = self.records[pos].version;
        if next_version == version {
            let next_revision = self.records[pos + 1].revision;
            let revision = self.records[pos].revision;
            self.records[pos + 1].revision = revision;
            self.records[pos].revision = next_revision;
        } else {
            let original_revision = self.records[pos].revision;
            // Make room at the front of the target version
            for record in &mut self.records {
                if record.version == next_version {
                    record.revision = record.revision.succ();
                }
            }
            let record = &mut self.records[pos];
            record.version = next_version;
            record.revision = REVISION_A;
            if original_revision == REVISION_A {
                self.renumber_versions();
            }
        }
        self.commit(&baseline)
    }

    /// Detaches a record into a brand-new highest version with revision `A`,
    /// then renumbers the remaining revisions of its original version.
    ///
    /// No-op unless the record's version currently has more than one
    /// revision.
    pub fn convert_to_version(&mut self, record_id: RecordId) -> EngineResult<()> {
        let pos = self.find(record_id)?;
        let old_version = self.records[pos].version;
        let siblings = self
            .map
            .revision_count(old_version)
            .map_err(|e| self.raise(e))?;
        if siblings <= 1 {
            return Ok(());
        }
        let baseline = self.baseline();
        let new_version = self.map.version_count() as u32 + 1;
        {
            let record = &mut self.records[pos];
            record.version = new_version;
            record.revision = REVISION_A;
        }
        // Close the gap in the original version, keeping existing order
        let mut next = REVISION_A;
        for record in &mut self.records {
            if record.version == old_version {
                record.revision = next;
                next = next.succ();
            }
        }
        self.commit(&baseline)
    }

    /// True for exactly one record: highest version, revision `A`
    pub fn is_latest(&self, record_id: RecordId) -> EngineResult<bool> {
        let pos = self.find(record_id)?;
        let record = &self.records[pos];
        let max_version = self.map.max_version().ok_or_else(|| {
            self.raise(EngineError::consistency(
                "map is empty while the snapshot holds records",
                self.map.to_string(),
            ))
        })?;
        Ok(record.version == max_version && record.revision == REVISION_A)
    }

    /// True for exactly one record: version 1, highest revision present for
    /// version 1.
    ///
    /// A title with records but no version 1 is a consistency violation, not
    /// a `false` return.
    pub fn is_earliest(&self, record_id: RecordId) -> EngineResult<bool> {
        let pos = self.find(record_id)?;
        let last = self.map.last_revision(1).map_err(|e| self.raise(e))?;
        let record = &self.records[pos];
        Ok(record.version == 1 && record.revision == last)
    }

    /// Re-reads all rows for the title and rebuilds the map
    fn rebuild(&mut self) -> EngineResult<()> {
        self.records = self.store.fetch_for_title(self.title_id)?;
        self.map = VersionMap::build(&self.records);
        Ok(())
    }

    /// Snapshot index of a record. A miss means the caller's id and the
    /// store have diverged.
    fn find(&self, record_id: RecordId) -> EngineResult<usize> {
        match self.records.iter().position(|r| r.record_id == record_id) {
            Some(pos) => Ok(pos),
            None => Err(self.raise(EngineError::consistency(
                format!(
                    "record {} is not present for title {}",
                    record_id, self.title_id
                ),
                self.map.to_string(),
            ))),
        }
    }

    /// Captures the position fields of every row before a mutation
    fn baseline(&self) -> Baseline {
        self.records
            .iter()
            .map(|r| (r.record_id, (r.version, r.revision)))
            .collect()
    }

    /// Writes back every row whose position changed since `baseline`, then
    /// resynchronizes the snapshot and map.
    fn commit(&mut self, baseline: &Baseline) -> EngineResult<()> {
        let changed: Vec<VersionRevision> = self
            .records
            .iter()
            .filter(|r| baseline.get(&r.record_id) != Some(&(r.version, r.revision)))
            .cloned()
            .collect();
        if !changed.is_empty() {
            self.store.update_batch(&changed)?;
        }
        self.rebuild()
    }

    /// Reassigns contiguous revision letters from `A` within every version,
    /// keeping existing order
    fn renumber_revisions(&mut self) {
        let mut next: HashMap<u32, Revision> = HashMap::new();
        for record in &mut self.records {
            let slot = next.entry(record.version).or_insert(REVISION_A);
            record.revision = *slot;
            *slot = slot.succ();
        }
    }

    /// Reassigns contiguous version numbers from 1, scanning records in
    /// ascending `(version, revision)` order and bumping the counter at each
    /// revision-`A` record
    fn renumber_versions(&mut self) {
        let mut order: Vec<usize> = (0..self.records.len()).collect();
        order.sort_by_key(|&i| (self.records[i].version, self.records[i].revision));
        let mut counter = 0u32;
        for i in order {
            if self.records[i].revision == REVISION_A {
                counter += 1;
            }
            self.records[i].version = counter;
        }
    }

    /// Logs consistency violations with the full map dump before returning
    /// the error
    fn raise(&self, err: EngineError) -> EngineError {
        if let EngineError::Consistency { message, .. } = &err {
            let title = self.title_id.to_string();
            let map = self.map.to_string();
            Logger::log_stderr(
                Severity::Error,
                "engine_consistency_violation",
                &[
                    ("map", map.as_str()),
                    ("message", message.as_str()),
                    ("title_id", title.as_str()),
                ],
            );
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn title() -> TitleId {
        TitleId::new(1)
    }

    #[test]
    fn test_open_engine_on_empty_title() {
        let mut store = MemoryStore::new();
        let engine = open_engine(title(), &mut store).unwrap();
        assert!(engine.records().is_empty());
        assert_eq!(engine.version_map().version_count(), 0);
    }

    #[test]
    fn test_add_rejects_empty_file_name() {
        let mut store = MemoryStore::new();
        let mut engine = open_engine(title(), &mut store).unwrap();
        let err = engine.add("").unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        let err = engine.add("   ").unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(engine.records().is_empty());
    }

    #[test]
    fn test_add_creates_new_highest_version() {
        let mut store = MemoryStore::new();
        let mut engine = open_engine(title(), &mut store).unwrap();
        engine.add("first.docx").unwrap();
        let id = engine.add("second.docx").unwrap();

        assert_eq!(engine.records().len(), 2);
        assert_eq!(engine.version_map().version_count(), 2);
        // Newest version heads the snapshot
        assert_eq!(engine.records()[0].record_id, id);
        assert_eq!(engine.records()[0].version, 2);
        assert_eq!(engine.records()[0].revision, REVISION_A);
    }

    #[test]
    fn test_stale_record_id_is_consistency_error() {
        let mut store = MemoryStore::new();
        let mut engine = open_engine(title(), &mut store).unwrap();
        engine.add("only.docx").unwrap();

        let stale = RecordId::new();
        let err = engine.remove(stale).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.dump().is_some());
    }

    #[test]
    fn test_move_up_on_latest_is_noop() {
        let mut store = MemoryStore::new();
        let mut engine = open_engine(title(), &mut store).unwrap();
        engine.add("v1.docx").unwrap();
        let latest = engine.add("v2.docx").unwrap();

        engine.move_up(latest).unwrap();
        assert_eq!(engine.records()[0].record_id, latest);
        assert_eq!(engine.records()[0].version, 2);
    }

    #[test]
    fn test_move_down_on_earliest_is_noop() {
        let mut store = MemoryStore::new();
        let mut engine = open_engine(title(), &mut store).unwrap();
        let earliest = engine.add("v1.docx").unwrap();
        engine.add("v2.docx").unwrap();

        engine.move_down(earliest).unwrap();
        let last = engine.records().last().unwrap();
        assert_eq!(last.record_id, earliest);
        assert_eq!(last.version, 1);
    }

    #[test]
    fn test_convert_is_noop_for_single_revision_version() {
        let mut store = MemoryStore::new();
        let mut engine = open_engine(title(), &mut store).unwrap();
        let only = engine.add("v1.docx").unwrap();

        engine.convert_to_version(only).unwrap();
        assert_eq!(engine.version_map().version_count(), 1);
        assert_eq!(engine.records()[0].version, 1);
    }

    #[test]
    fn test_remove_last_record_leaves_empty_title() {
        let mut store = MemoryStore::new();
        let mut engine = open_engine(title(), &mut store).unwrap();
        let only = engine.add("v1.docx").unwrap();

        engine.remove(only).unwrap();
        assert!(engine.records().is_empty());
        assert_eq!(engine.version_map().version_count(), 0);
        assert!(store.is_empty());
    }
}
