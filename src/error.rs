//! Error types for syncview.

use thiserror::Error;

/// Errors raised by the checked keyed-table update path.
///
/// Only [`KeyedTable::apply_checked`](crate::table::KeyedTable::apply_checked)
/// reports these; the unchecked path best-effort overwrites instead. Keys
/// are carried pre-formatted so the error type stays non-generic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    /// An "added" entry's key was already present in the prior state.
    #[error("added key already present: {key}")]
    DuplicateAdd { key: String },

    /// A "removed" entry's key was absent from the prior state.
    #[error("removed key not present: {key}")]
    MissingRemove { key: String },

    /// A "changed" entry's key was absent from the prior state.
    #[error("changed key not present: {key}")]
    MissingChange { key: String },
}

/// Result type alias for keyed-table operations.
pub type TableResult<T> = Result<T, TableError>;
