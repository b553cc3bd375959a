//! Registered detectors.
//!
//! To add a detector, implement [`IncompatibilityDetector`] and append it to
//! [`default_detectors`]. Order matters: the checker returns the first finding.

mod player_head;

pub use player_head::PlayerHeadEmptyNameDetector;

use crate::IncompatibilityDetector;

/// The detector registry, in evaluation order.
#[must_use]
pub fn default_detectors() -> Vec<Box<dyn IncompatibilityDetector>> {
    vec![Box::new(PlayerHeadEmptyNameDetector::new())]
}
