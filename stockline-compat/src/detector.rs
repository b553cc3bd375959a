use crate::{CompatResult, Incompatibility};
use stockline_types::{HostVersion, Item};

/// A predicate flagging one class of item shapes the host mishandles.
///
/// Implementations must be pure: no I/O, no interior mutability. Return
/// `Ok(None)` for compatible items and reserve `Err` for cases where the
/// detector genuinely cannot decide.
pub trait IncompatibilityDetector: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Checks a single item.
    fn detect(&self, item: &Item) -> CompatResult<Option<Incompatibility>>;

    /// First host version carrying the defect.
    fn affected_since(&self) -> HostVersion;

    /// Host version in which the defect was fixed, if any.
    fn fixed_in(&self) -> Option<HostVersion> {
        None
    }

    /// Whether the defect exists on the given host version.
    fn is_relevant(&self, host: &HostVersion) -> bool {
        if let Some(fixed) = self.fixed_in() {
            if *host >= fixed {
                return false;
            }
        }
        *host >= self.affected_since()
    }
}
