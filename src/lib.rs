//! folio - version/revision bookkeeping for manuscript submission tracking
//!
//! For a single title, maintains an ordered two-level numbering scheme
//! (integer version, letter-coded revision) over a set of document records.
//! The engine supports add, remove, move up, move down, and
//! convert-to-version, and restores dense numbering after every mutation:
//! versions 1..N with no gaps, revisions contiguous from `A` within each
//! version.

pub mod engine;
pub mod model;
pub mod observability;
pub mod store;
