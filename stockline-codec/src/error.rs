use std::string::FromUtf8Error;
use stockline_types::HostError;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while encoding or decoding a record.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded payload is not UTF-8 text.
    #[error("payload is not UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// The payload text is not a JSON tree.
    #[error("invalid tree: {0}")]
    Tree(#[from] serde_json::Error),

    /// The tree has no `item` section.
    #[error("tree has no item section")]
    MissingItemSection,

    /// The tree matches a known-corrupt pattern.
    #[error("corrupt tree: {0}")]
    CorruptTree(String),

    /// The tree nests deeper than the configured limit.
    #[error("tree exceeds maximum depth of {0}")]
    TooDeep(usize),

    /// The payload is longer than the configured limit.
    #[error("payload of {len} bytes exceeds limit of {max}")]
    PayloadTooLarge { len: usize, max: usize },

    /// The legacy object stream contained no items.
    #[error("legacy payload contains no items")]
    EmptyLegacyPayload,

    /// The host platform faulted.
    #[error(transparent)]
    Host(#[from] HostError),

    /// Neither encoding could represent the item.
    #[error("item could not be encoded: {0}")]
    EncodeFailed(String),

    /// A mistagged modern payload also failed as legacy.
    #[error("modern decode failed ({modern}); legacy fallback failed ({legacy})")]
    BothPathsFailed { modern: String, legacy: String },
}
