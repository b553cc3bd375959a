//! Tagged single-line item codec for stockline.
//!
//! Every item is stored as one line of text:
//!
//! | Text | Meaning |
//! |---|---|
//! | empty | no item |
//! | `MODERN:<base64>` | base64 of the JSON text `{"item": <host tree>}` |
//! | `LEGACY:<base64>` | base64 of the host's binary object graph |
//! | `<base64>` | untagged historical record, decoded as legacy |
//!
//! Base64 never contains `~`, so records can be joined with `~` inside
//! container fields.
//!
//! [`ItemCodec`] picks the generation on encode, consulting the
//! [`CompatibilityChecker`](stockline_compat::CompatibilityChecker) first
//! and falling back to legacy when the host faults.

mod book;
mod codec;
mod config;
mod error;
mod record;
mod tree;

pub use codec::{preview, ItemCodec};
pub use config::CodecConfig;
pub use error::{CodecError, CodecResult};
pub use record::{RecordTag, SerializedRecord, LEGACY_PREFIX, MODERN_PREFIX};
