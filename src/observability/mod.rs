//! Structured logging for engine diagnostics
//!
//! One log line = one event, emitted synchronously with no buffering. Lines
//! are JSON objects with deterministic (alphabetical) key ordering so log
//! output is stable across runs.

mod logger;

pub use logger::{Logger, Severity};
