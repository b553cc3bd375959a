//! Record store adapter for stockline.
//!
//! The migration engine reads and writes the persisted store only through
//! [`RecordStore`]. [`JsonFileStore`] is the bundled implementation: one JSON
//! document on disk, timestamped backup copies, atomic replace on save.

mod document;
mod error;
mod file_store;

pub use document::{StoreDocument, DATA_VERSION_KEY, ITEMS_KEY, MISC_KEY, SELLERS_KEY};
pub use error::{StoreError, StoreResult};
pub use file_store::JsonFileStore;

use std::path::PathBuf;

/// Load/save/backup access to a persisted store.
pub trait RecordStore {
    /// Reads the whole document.
    fn load(&self) -> StoreResult<StoreDocument>;

    /// Replaces the whole document.
    fn save(&self, document: &StoreDocument) -> StoreResult<()>;

    /// Copies the current persisted document aside and returns where it went.
    fn backup(&self) -> StoreResult<PathBuf>;
}
