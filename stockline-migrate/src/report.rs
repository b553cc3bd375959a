use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use stockline_compat::Incompatibility;
use tracing::{info, warn};

/// Counts from one migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Store format version found on load.
    pub data_version_before: u32,
    pub shops: usize,
    /// Fields rewritten as `MODERN:`.
    pub converted: usize,
    pub already_modern: usize,
    /// Fields kept or rewritten as `LEGACY:`.
    pub quarantined: usize,
    /// Fields left untouched because they could not be migrated.
    pub unparseable: usize,
    /// Quarantined fields promoted to `MODERN:` by the re-migration pass.
    pub promoted: usize,
    /// Container misc entries rewritten.
    pub containers_migrated: usize,
    /// Quarantine reasons and how often each occurred.
    pub findings: BTreeMap<Incompatibility, usize>,
    pub persisted: bool,
    pub backup_path: Option<PathBuf>,
}

impl MigrationReport {
    /// Counts a quarantined field. `None` means the modern encoder faulted
    /// without a detector finding.
    pub(crate) fn record_quarantine(&mut self, finding: Option<Incompatibility>) {
        self.quarantined += 1;
        if let Some(finding) = finding {
            *self.findings.entry(finding).or_default() += 1;
        }
    }

    /// Total fields rewritten in either generation.
    #[must_use]
    pub fn changed_fields(&self) -> usize {
        self.converted + self.quarantined + self.promoted
    }

    /// Logs the run summary, then one warning per finding group.
    pub fn log_summary(&self) {
        info!(
            shops = self.shops,
            converted = self.converted,
            already_modern = self.already_modern,
            quarantined = self.quarantined,
            unparseable = self.unparseable,
            promoted = self.promoted,
            containers_migrated = self.containers_migrated,
            persisted = self.persisted,
            "migration finished"
        );

        for (finding, count) in &self.findings {
            warn!(
                finding = finding.id(),
                affected = finding.affected_versions(),
                remediation = finding.remediation(),
                count = *count,
                "{}",
                finding.description()
            );
        }
    }
}
