//! Error types for compatibility detection.

use thiserror::Error;

/// Result type for detector calls.
pub type CompatResult<T> = Result<T, DetectorFault>;

/// A detector could not reach a verdict.
///
/// Faults are not findings: the checker logs them separately and treats the
/// item as passing that detector.
#[derive(Debug, Error)]
pub enum DetectorFault {
    /// An attribute the detector inspects has an unexpected shape.
    #[error("malformed attribute {field}: {reason}")]
    MalformedAttribute { field: String, reason: String },

    /// Any other internal failure.
    #[error("detector failure: {0}")]
    Internal(String),
}
