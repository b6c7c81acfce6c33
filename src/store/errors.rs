//! Store error types
//!
//! The engine owns no transaction or retry policy; store failures propagate
//! to the caller untouched.

use thiserror::Error;

use crate::model::RecordId;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures of the backing row store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No row with the given record id exists
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// A row with the given record id already exists
    #[error("record already exists: {0}")]
    DuplicateRecord(RecordId),

    /// Backend failure (I/O, connection, constraint)
    #[error("storage backend failure: {0}")]
    Backend(String),
}
