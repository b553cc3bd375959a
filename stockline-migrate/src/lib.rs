//! Store migration for stockline.
//!
//! [`MigrationEngine`] runs once at startup against a
//! [`RecordStore`](stockline_store::RecordStore). Each stored record field is
//! in one of four states:
//!
//! | State | Text | Transition |
//! |---|---|---|
//! | [`FieldState::Modern`] | `MODERN:…` | none |
//! | [`FieldState::LegacyTagged`] | `LEGACY:…` or bare base64 | decode, classify, re-encode |
//! | [`FieldState::LegacyUntagged`] | `amount~TYPE~…` positional row | convert, then as `LegacyTagged` |
//! | [`FieldState::Unparseable`] | anything else | left untouched, counted |
//!
//! Items a relevant detector flags stay in the legacy encoding until a later
//! run on a fixed host promotes them.

mod config;
mod engine;
mod error;
mod field;
mod positional;
mod report;

pub use config::{MigrationConfig, StocklineConfig};
pub use engine::MigrationEngine;
pub use error::{MigrationError, MigrationResult, RowError};
pub use field::{FieldState, ALT_SEPARATOR, ITEM_SEPARATOR};
pub use positional::{PositionalRow, MIN_FIELDS};
pub use report::MigrationReport;

/// Store format version written by this release.
pub const CURRENT_DATA_VERSION: u32 = 4;
