//! Engine error types
//!
//! Two distinct failure kinds plus pass-through store failures:
//!
//! - `Validation` — bad caller input, checked before any side effect;
//!   ordinary recoverable error
//! - `Consistency` — the version map and the row store disagree; carries a
//!   diagnostic dump of the map, and the engine instance must be discarded
//! - `Store` — backend failure, propagated untouched

use thiserror::Error;

use crate::store::StoreError;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by the renumbering engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Invalid caller input; no side effects occurred
    #[error("validation failed: {0}")]
    Validation(String),

    /// The in-memory map and the row store disagree. The engine instance is
    /// stale and must be discarded; `dump` holds the full version map for
    /// debugging.
    #[error("internal consistency violation: {message}")]
    Consistency {
        /// What disagreed
        message: String,
        /// Full version/revision map at the time of the failure
        dump: String,
    },

    /// Backing store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a consistency error carrying a map dump
    pub fn consistency(message: impl Into<String>, dump: impl Into<String>) -> Self {
        Self::Consistency {
            message: message.into(),
            dump: dump.into(),
        }
    }

    /// Returns true if the engine instance must be discarded
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Consistency { .. })
    }

    /// Returns the diagnostic map dump, if this error carries one
    pub fn dump(&self) -> Option<&str> {
        match self {
            Self::Consistency { dump, .. } => Some(dump),
            _ => None,
        }
    }
}
