//! Error types for migration runs.

use stockline_store::StoreError;
use thiserror::Error;

/// Result type for migration operations.
pub type MigrationResult<T> = Result<T, MigrationError>;

/// Errors that abort a migration run.
///
/// Per-shop and per-field failures never surface here; they are logged and
/// counted in the report.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The store could not be loaded or saved.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The pre-migration backup could not be written. The store is untouched.
    #[error("backup failed, migration aborted: {0}")]
    BackupFailed(#[source] StoreError),
}

/// Why a positional row could not be converted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    /// Fewer than the four mandatory fields.
    #[error("row has {0} fields, at least 4 are required")]
    TooFewFields(usize),

    /// A mandatory field does not parse.
    #[error("field {index} ({name}) is invalid: {value:?}")]
    InvalidField {
        index: usize,
        name: &'static str,
        value: String,
    },
}
