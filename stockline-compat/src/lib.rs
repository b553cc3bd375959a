//! Compatibility detection for stockline items.
//!
//! Some host versions ship defects that make specific item shapes crash during
//! reconstruction. This crate classifies items against a fixed, ordered list
//! of detectors, each scoped to the host versions it affects:
//!
//! - [`Incompatibility`]: the compile-time catalogue of known defect classes
//! - [`IncompatibilityDetector`]: one predicate per defect class
//! - [`CompatibilityChecker`]: runs the relevant detectors, first finding wins
//!
//! The checker holds no state beyond its detector list and the host version,
//! so it can be shared freely between threads.

mod checker;
mod detector;
pub mod detectors;
mod error;
mod finding;

pub use checker::CompatibilityChecker;
pub use detector::IncompatibilityDetector;
pub use detectors::{default_detectors, PlayerHeadEmptyNameDetector};
pub use error::{CompatResult, DetectorFault};
pub use finding::Incompatibility;
