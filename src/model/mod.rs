//! Data model for title revision records
//!
//! A title's document history is a flat set of `VersionRevision` rows, each
//! carrying a `(version, revision)` position plus descriptive file metadata.
//!
//! # Invariants (maintained by the engine, not by these types)
//!
//! - `(version, revision)` pairs are unique within a title
//! - Revisions within a version are contiguous starting at `A`
//! - Version numbers in use are contiguous starting at 1
//! - "Latest" is the record with the highest version and revision `A`
//! - "Earliest" is the record with version 1 and its highest revision letter

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a title (the owning row in the titles table, out of scope
/// here beyond its key).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TitleId(i64);

impl TitleId {
    /// Wraps a raw title key
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw key
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identity of a single revision record.
///
/// Survives renumbering: moving a record to a different `(version, revision)`
/// slot never changes its id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generates a fresh record id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// First revision letter of every version
pub const REVISION_A: Revision = Revision(b'A');

/// A revision letter, stored as its code point (`A` = 65).
///
/// Incremented and decremented arithmetically during renumbering. Rendering
/// as a character is for diagnostics and display only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Revision(u8);

impl Revision {
    /// Builds a revision from its letter
    pub fn from_letter(letter: char) -> Self {
        Self(letter as u8)
    }

    /// Returns the raw code point
    pub fn code(&self) -> u8 {
        self.0
    }

    /// The next revision letter
    pub fn succ(&self) -> Self {
        Self(self.0 + 1)
    }

    /// The previous revision letter.
    ///
    /// Callers only invoke this on letters above `A`; the floor guards the
    /// arithmetic regardless.
    pub fn pred(&self) -> Self {
        if self.0 > b'A' {
            Self(self.0 - 1)
        } else {
            *self
        }
    }

    /// Zero-based position of this letter within its version (`A` = 0)
    pub fn index(&self) -> u8 {
        self.0 - b'A'
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0 as char)
    }
}

/// One row per document version of a title.
///
/// Only `version` and `revision` participate in ordering; the remaining
/// fields are descriptive metadata refreshed by the surrounding system when
/// the file name changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRevision {
    /// Stable record identity
    pub record_id: RecordId,
    /// Owning title
    pub title_id: TitleId,
    /// Major ordinal, 1-based, dense within the title
    pub version: u32,
    /// Minor ordinal, contiguous from `A` within the version
    pub revision: Revision,
    /// Document file name
    pub file_name: String,
    /// Last modification time of the document
    pub updated: DateTime<Utc>,
    /// Document size in bytes
    pub size: u64,
    /// Word count of the document
    pub word_count: u32,
    /// Document format (e.g. extension-derived)
    pub doc_type: String,
    /// Free-form note
    pub note: String,
    /// Language key
    pub lang_id: i64,
}

impl VersionRevision {
    /// Creates a record at the given position with default metadata.
    ///
    /// Size, word count and document type are left at their defaults; the
    /// surrounding system recomputes them from the file when it persists the
    /// row.
    pub fn new(
        title_id: TitleId,
        version: u32,
        revision: Revision,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            record_id: RecordId::new(),
            title_id,
            version,
            revision,
            file_name: file_name.into(),
            updated: Utc::now(),
            size: 0,
            word_count: 0,
            doc_type: String::new(),
            note: String::new(),
            lang_id: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_arithmetic() {
        assert_eq!(REVISION_A.succ(), Revision::from_letter('B'));
        assert_eq!(Revision::from_letter('C').pred(), Revision::from_letter('B'));
        assert_eq!(REVISION_A.index(), 0);
        assert_eq!(Revision::from_letter('D').index(), 3);
    }

    #[test]
    fn test_revision_pred_floors_at_a() {
        assert_eq!(REVISION_A.pred(), REVISION_A);
    }

    #[test]
    fn test_revision_ordering_follows_letters() {
        assert!(REVISION_A < Revision::from_letter('B'));
        assert!(Revision::from_letter('B') < Revision::from_letter('C'));
    }

    #[test]
    fn test_revision_displays_as_letter() {
        assert_eq!(Revision::from_letter('B').to_string(), "B");
        assert_eq!(REVISION_A.to_string(), "A");
    }

    #[test]
    fn test_new_record_defaults() {
        let rec = VersionRevision::new(TitleId::new(7), 1, REVISION_A, "draft.docx");
        assert_eq!(rec.title_id, TitleId::new(7));
        assert_eq!(rec.version, 1);
        assert_eq!(rec.revision, REVISION_A);
        assert_eq!(rec.file_name, "draft.docx");
        assert_eq!(rec.size, 0);
        assert_eq!(rec.word_count, 0);
        assert!(rec.note.is_empty());
    }

    #[test]
    fn test_record_ids_are_unique() {
        let a = VersionRevision::new(TitleId::new(1), 1, REVISION_A, "a.docx");
        let b = VersionRevision::new(TitleId::new(1), 2, REVISION_A, "b.docx");
        assert_ne!(a.record_id, b.record_id);
    }
}
