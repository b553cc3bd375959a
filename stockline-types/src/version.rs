//! Host platform version parsing and ordering.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version of the running host platform, e.g. `1.21.10`.
///
/// Ordering is numeric per component. Missing components parse as zero, so
/// `1.21` equals `1.21.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HostVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl HostVersion {
    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses a version from a bare version string or a host banner.
    ///
    /// Banners such as `git-Spigot-4502 (MC: 1.21.10)` carry a build number
    /// before the game version; the `MC:` marker wins when present, otherwise
    /// the first dotted numeric run is used.
    pub fn parse(s: &str) -> crate::Result<Self> {
        let scan = match s.find("MC:") {
            Some(idx) => &s[idx + 3..],
            None => s,
        };

        let run = first_numeric_run(scan).ok_or_else(|| Error::InvalidVersion(s.to_string()))?;

        let mut parts = [0u32; 3];
        for (slot, piece) in parts.iter_mut().zip(run.split('.')) {
            if piece.is_empty() {
                break;
            }
            *slot = piece
                .parse()
                .map_err(|_| Error::InvalidVersion(s.to_string()))?;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

/// Returns the first run of `[0-9.]` that starts with a digit, without a
/// trailing dot.
fn first_numeric_run(s: &str) -> Option<&str> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    Some(rest[..end].trim_end_matches('.'))
}

impl fmt::Display for HostVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for HostVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HostVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HostVersion> for String {
    fn from(version: HostVersion) -> Self {
        version.to_string()
    }
}
