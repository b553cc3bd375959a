use crate::{default_detectors, Incompatibility, IncompatibilityDetector};
use std::fmt;
use stockline_types::{HostVersion, Item};
use tracing::error;

/// Runs the registered detectors against items for one host version.
pub struct CompatibilityChecker {
    host_version: HostVersion,
    detectors: Vec<Box<dyn IncompatibilityDetector>>,
}

impl CompatibilityChecker {
    /// Checker with the default detector registry.
    #[must_use]
    pub fn new(host_version: HostVersion) -> Self {
        Self::with_detectors(host_version, default_detectors())
    }

    /// Checker with an explicit, ordered detector list.
    #[must_use]
    pub fn with_detectors(
        host_version: HostVersion,
        detectors: Vec<Box<dyn IncompatibilityDetector>>,
    ) -> Self {
        Self {
            host_version,
            detectors,
        }
    }

    #[must_use]
    pub fn host_version(&self) -> HostVersion {
        self.host_version
    }

    /// Returns the first finding from the relevant detectors, in order.
    ///
    /// A detector fault is logged and treated as a pass for that detector;
    /// the remaining detectors still run.
    pub fn classify(&self, item: &Item) -> Option<Incompatibility> {
        for detector in self.relevant_detectors() {
            match detector.detect(item) {
                Ok(Some(finding)) => return Some(finding),
                Ok(None) => {}
                Err(e) => {
                    error!(
                        detector = detector.name(),
                        item_type = %item.item_type,
                        error = %e,
                        "compatibility detector faulted; treating item as passing it"
                    );
                }
            }
        }
        None
    }

    #[must_use]
    pub fn is_compatible(&self, item: &Item) -> bool {
        self.classify(item).is_none()
    }

    /// Classifies every item independently. Duplicates are kept.
    pub fn classify_all(&self, items: &[Item]) -> Vec<Incompatibility> {
        items.iter().filter_map(|item| self.classify(item)).collect()
    }

    /// Returns true as soon as one item is flagged.
    pub fn has_incompatible(&self, items: &[Item]) -> bool {
        items.iter().any(|item| self.classify(item).is_some())
    }

    pub fn count_incompatible(&self, items: &[Item]) -> usize {
        items.iter().filter(|item| self.classify(item).is_some()).count()
    }

    /// Detectors whose defect exists on this host version.
    pub fn relevant_detectors(&self) -> impl Iterator<Item = &dyn IncompatibilityDetector> {
        self.detectors
            .iter()
            .map(|d| &**d)
            .filter(|d| d.is_relevant(&self.host_version))
    }

    /// Number of relevant detectors. Zero means every known defect is
    /// believed fixed on this host.
    pub fn count_relevant(&self) -> usize {
        self.relevant_detectors().count()
    }

    #[must_use]
    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }
}

impl fmt::Debug for CompatibilityChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompatibilityChecker")
            .field("host_version", &self.host_version)
            .field(
                "detectors",
                &self.detectors.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
