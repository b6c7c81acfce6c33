//! Row-store contract consumed by the renumbering engine
//!
//! The engine never talks to a database directly; it reads a title's rows
//! through this trait, edits an owned snapshot, and writes back only the
//! changed rows in one pass. `MemoryStore` is the reference implementation
//! and test double; production backends adapt their own persistence to the
//! same contract.

mod errors;
mod memory;

pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;

use crate::model::{RecordId, TitleId, VersionRevision};

/// Persistence contract for revision rows.
///
/// Implementations must return rows ordered `version DESC, revision ASC`;
/// the engine's snapshot ordering and all position-relative reasoning depend
/// on it.
pub trait RevisionStore {
    /// Fetches every revision row for a title, ordered `version DESC,
    /// revision ASC`.
    fn fetch_for_title(&self, title_id: TitleId) -> StoreResult<Vec<VersionRevision>>;

    /// Inserts a new row. Fails if the record id is already present.
    fn insert(&mut self, record: &VersionRevision) -> StoreResult<()>;

    /// Writes back the given rows in one pass. Every row must already exist.
    fn update_batch(&mut self, records: &[VersionRevision]) -> StoreResult<()>;

    /// Deletes a row by record id. Fails if the id is unknown.
    fn delete(&mut self, record_id: RecordId) -> StoreResult<()>;
}
