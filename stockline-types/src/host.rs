//! The host platform's object primitives.
//!
//! The host owns the real object model. The core treats these four
//! operations as already solved and opaque beyond their signatures; any of
//! them may fault, and faults must never escape the core as panics.

use crate::{HostVersion, Item};
use thiserror::Error;

/// Structured tree produced by the host's native encoder.
pub type Tree = serde_json::Value;

/// Result type for host primitive calls.
pub type HostResult<T> = Result<T, HostError>;

/// Faults raised by the host platform's primitives.
#[derive(Debug, Error)]
pub enum HostError {
    /// Native or legacy encoding failed.
    #[error("host encode failed: {0}")]
    Encode(String),

    /// Native or legacy decoding failed.
    #[error("host decode failed: {0}")]
    Decode(String),

    /// The host crashed on a shape it is known to mishandle.
    #[error("host defect triggered: {0}")]
    Defect(String),

    /// Serialization error inside the host.
    #[error("host serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The encode/decode capability provided by the surrounding platform.
///
/// Implementations must be safe to share across threads: the codec calls
/// them from the main thread and from background persistence workers.
pub trait HostPlatform: Send + Sync {
    /// Version of the running host.
    fn version(&self) -> HostVersion;

    /// Current data epoch stamped onto items by [`native_decode`](Self::native_decode).
    fn data_version(&self) -> u32;

    /// Item → structured tree.
    fn native_encode(&self, item: &Item) -> HostResult<Tree>;

    /// Structured tree → item, upgraded to the current data epoch.
    fn native_decode(&self, tree: &Tree) -> HostResult<Item>;

    /// Items → binary object graph.
    fn legacy_encode(&self, items: &[Item]) -> HostResult<Vec<u8>>;

    /// Binary object graph → items. May yield an empty list.
    fn legacy_decode(&self, bytes: &[u8]) -> HostResult<Vec<Item>>;
}
