//! Tagged single-line record text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag marking a structured-tree payload.
pub const MODERN_PREFIX: &str = "MODERN:";

/// Tag marking a binary object-graph payload.
pub const LEGACY_PREFIX: &str = "LEGACY:";

/// Encoding generation announced by a record's tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordTag {
    Modern,
    Legacy,
    /// No tag; historical records written before tagging existed. Decoded as
    /// legacy.
    Untagged,
}

impl RecordTag {
    /// Classifies record text without decoding it. Returns `None` for empty
    /// text.
    #[must_use]
    pub fn of(text: &str) -> Option<Self> {
        if text.is_empty() {
            None
        } else if text.starts_with(MODERN_PREFIX) {
            Some(Self::Modern)
        } else if text.starts_with(LEGACY_PREFIX) {
            Some(Self::Legacy)
        } else {
            Some(Self::Untagged)
        }
    }

    /// Returns the payload of `text` under this tag.
    #[must_use]
    pub fn payload(self, text: &str) -> &str {
        let prefix = match self {
            Self::Modern => MODERN_PREFIX,
            Self::Legacy => LEGACY_PREFIX,
            Self::Untagged => "",
        };
        text.strip_prefix(prefix).unwrap_or(text)
    }

    /// True for both tagged and untagged legacy records.
    #[must_use]
    pub fn is_legacy(self) -> bool {
        matches!(self, Self::Legacy | Self::Untagged)
    }
}

/// One encoded item, as stored in a record field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerializedRecord(String);

impl SerializedRecord {
    pub(crate) fn modern(payload: &str) -> Self {
        Self(format!("{MODERN_PREFIX}{payload}"))
    }

    pub(crate) fn legacy(payload: &str) -> Self {
        Self(format!("{LEGACY_PREFIX}{payload}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    #[must_use]
    pub fn tag(&self) -> Option<RecordTag> {
        RecordTag::of(&self.0)
    }

    #[must_use]
    pub fn is_modern(&self) -> bool {
        self.tag() == Some(RecordTag::Modern)
    }

    #[must_use]
    pub fn is_legacy(&self) -> bool {
        self.tag().is_some_and(RecordTag::is_legacy)
    }
}

impl fmt::Display for SerializedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SerializedRecord {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<SerializedRecord> for String {
    fn from(record: SerializedRecord) -> Self {
        record.0
    }
}
