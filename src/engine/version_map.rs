//! Version map: derived grouping of revision letters by version
//!
//! Derived, in-memory-only state mirroring the row store, never the source
//! of truth. Rebuilt by a full re-scan after every structural mutation, not
//! patched incrementally.
//!
//! Lookups against a version number the map does not hold indicate that the
//! caller's view and the store have diverged; they surface as consistency
//! errors, not as "not found" user errors.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{json, Value};

use super::errors::{EngineError, EngineResult};
use crate::model::{Revision, VersionRevision};

/// Mapping from version number to the ordered revision letters present for
/// that version
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionMap {
    by_version: BTreeMap<u32, Vec<Revision>>,
}

impl VersionMap {
    /// Builds the map from rows ordered `version DESC, revision ASC`.
    ///
    /// Letters are kept in row order, so within a version they run ascending.
    pub fn build(records: &[VersionRevision]) -> Self {
        let mut by_version: BTreeMap<u32, Vec<Revision>> = BTreeMap::new();
        for record in records {
            by_version
                .entry(record.version)
                .or_default()
                .push(record.revision);
        }
        Self { by_version }
    }

    /// Number of versions currently in use
    pub fn version_count(&self) -> usize {
        self.by_version.len()
    }

    /// Highest version number in use, if any
    pub fn max_version(&self) -> Option<u32> {
        self.by_version.keys().next_back().copied()
    }

    /// Returns true if the map holds the given version
    pub fn contains(&self, version: u32) -> bool {
        self.by_version.contains_key(&version)
    }

    /// Number of revisions recorded for `version`.
    ///
    /// A missing version is a consistency violation: the caller is holding a
    /// stale version number.
    pub fn revision_count(&self, version: u32) -> EngineResult<usize> {
        match self.by_version.get(&version) {
            Some(revisions) => Ok(revisions.len()),
            None => Err(self.missing_version(version)),
        }
    }

    /// Last revision letter recorded for `version` (the highest present,
    /// since the map is rebuilt from ordered rows after every edit).
    pub fn last_revision(&self, version: u32) -> EngineResult<Revision> {
        match self.by_version.get(&version).and_then(|r| r.last()) {
            Some(revision) => Ok(*revision),
            None => Err(self.missing_version(version)),
        }
    }

    /// JSON rendering of the map for diagnostic dumps, versions descending
    pub fn dump(&self) -> Value {
        let versions: Vec<Value> = self
            .by_version
            .iter()
            .rev()
            .map(|(version, revisions)| {
                let letters: Vec<String> =
                    revisions.iter().map(|r| r.to_string()).collect();
                json!({ "version": version, "revisions": letters })
            })
            .collect();
        json!({ "versions": versions })
    }

    fn missing_version(&self, version: u32) -> EngineError {
        EngineError::consistency(
            format!("version {} is not present in the map", version),
            self.to_string(),
        )
    }
}

impl fmt::Display for VersionMap {
    /// Compact one-line rendering, versions descending: `2: A,B | 1: A`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.by_version.is_empty() {
            return write!(f, "(empty)");
        }
        let mut first = true;
        for (version, revisions) in self.by_version.iter().rev() {
            if !first {
                write!(f, " | ")?;
            }
            first = false;
            write!(f, "{}: ", version)?;
            for (i, revision) in revisions.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", revision)?;
            }
        }
        Ok(())
    }
}
