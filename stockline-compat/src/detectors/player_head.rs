//! Player heads whose owner profile has an empty name.
//!
//! Old custom-head generators wrote owner profiles with `name: ""` next to a
//! placeholder UUID. Hosts from 1.21.10 on filter the empty name out of an
//! `Optional` and then unwrap it, so reconstructing such a head crashes.

use crate::{CompatResult, DetectorFault, Incompatibility, IncompatibilityDetector};
use serde_json::Value;
use stockline_types::{HostVersion, Item};
use tracing::debug;

const PLAYER_HEAD: &str = "PLAYER_HEAD";
const OWNER_KEY: &str = "skull-owner";

/// First host version with the stricter profile validation.
const FIRST_AFFECTED: HostVersion = HostVersion::new(1, 21, 10);

/// Flags `PLAYER_HEAD` items whose owner has a missing or empty name.
#[derive(Debug, Clone, Default)]
pub struct PlayerHeadEmptyNameDetector {
    fixed_in: Option<HostVersion>,
}

impl PlayerHeadEmptyNameDetector {
    /// Detector with no known fix version.
    #[must_use]
    pub fn new() -> Self {
        Self { fixed_in: None }
    }

    /// Detector that stops being relevant from `version` on.
    #[must_use]
    pub fn fixed_in_version(version: HostVersion) -> Self {
        Self {
            fixed_in: Some(version),
        }
    }
}

impl IncompatibilityDetector for PlayerHeadEmptyNameDetector {
    fn name(&self) -> &'static str {
        "player-head-empty-name"
    }

    fn detect(&self, item: &Item) -> CompatResult<Option<Incompatibility>> {
        if !item.is_type(PLAYER_HEAD) {
            return Ok(None);
        }

        let owner = match item.meta.get(OWNER_KEY) {
            None | Some(Value::Null) => return Ok(None), // vanilla head, no profile
            Some(owner) => owner,
        };

        let flagged = match owner {
            Value::Object(profile) => match profile.get("name") {
                Some(Value::String(name)) => name.is_empty(),
                // missing, null or non-string names all trip the host
                _ => true,
            },
            Value::String(name) => name.is_empty(),
            other => {
                return Err(DetectorFault::MalformedAttribute {
                    field: OWNER_KEY.to_string(),
                    reason: format!("expected object or string, got {}", json_kind(other)),
                });
            }
        };

        if flagged {
            let unique_id = owner.get("uniqueId").and_then(Value::as_str).unwrap_or("-");
            debug!(unique_id, "player head owner has no usable name");
            Ok(Some(Incompatibility::PlayerHeadEmptyName))
        } else {
            Ok(None)
        }
    }

    fn affected_since(&self) -> HostVersion {
        FIRST_AFFECTED
    }

    fn fixed_in(&self) -> Option<HostVersion> {
        self.fixed_in
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
