use serde::{Deserialize, Serialize};
use std::fmt;

/// Known classes of host defects.
///
/// Each variant carries a description, the affected host versions, and the
/// remediation shown to operators. The catalogue is fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Incompatibility {
    /// Player heads whose owner profile has an empty name. Hosts from
    /// 1.21.10 on reject the empty name during reconstruction.
    PlayerHeadEmptyName,
    /// Shulker boxes carrying inventory data the host cannot rebuild.
    ShulkerBoxInvalidData,
    /// An item failed validation without matching a known pattern.
    Unknown,
}

impl Incompatibility {
    /// Stable identifier used in logs and reports.
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Self::PlayerHeadEmptyName => "PLAYER_HEAD_EMPTY_NAME",
            Self::ShulkerBoxInvalidData => "SHULKER_BOX_INVALID_DATA",
            Self::Unknown => "UNKNOWN",
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::PlayerHeadEmptyName => "Custom player head with empty name field",
            Self::ShulkerBoxInvalidData => "Shulker box with invalid inventory data",
            Self::Unknown => "Unknown item incompatibility",
        }
    }

    #[must_use]
    pub fn affected_versions(&self) -> &'static str {
        match self {
            Self::PlayerHeadEmptyName => "1.21.10+",
            Self::ShulkerBoxInvalidData => "Unknown (future issue)",
            Self::Unknown => "Unknown",
        }
    }

    #[must_use]
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::PlayerHeadEmptyName => {
                "Remove old custom heads and recreate the shop with heads from an updated plugin"
            }
            Self::ShulkerBoxInvalidData => "Transfer contents to a new shulker box",
            Self::Unknown => "Contact the server administrator or plugin support",
        }
    }

    /// One-line rendering for logs: `[ID] description (Affected: ...) - Solution: ...`.
    #[must_use]
    pub fn formatted(&self) -> String {
        format!(
            "[{}] {} (Affected: {}) - Solution: {}",
            self.id(),
            self.description(),
            self.affected_versions(),
            self.remediation()
        )
    }
}

impl fmt::Display for Incompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}
