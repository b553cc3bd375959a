//! Configuration for the codec and migration engine, read from
//! `stockline.toml`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use stockline_codec::CodecConfig;
use tracing::{info, warn};

/// Migration engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Misc keys whose values hold `~`-joined item records.
    pub container_keys: Vec<String>,
    /// Run the promotion pass when no detector is relevant.
    pub remigrate_quarantined: bool,
}

fn default_container_keys() -> Vec<String> {
    vec!["chest1".to_string(), "chest2".to_string()]
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            container_keys: default_container_keys(),
            remigrate_quarantined: true,
        }
    }
}

impl MigrationConfig {
    #[must_use]
    pub fn is_container_key(&self, key: &str) -> bool {
        self.container_keys.iter().any(|k| k == key)
    }
}

/// Top-level configuration file.
///
/// ```toml
/// [codec]
/// verbose_diagnostics = true
///
/// [migration]
/// container_keys = ["chest1", "chest2", "chest3"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StocklineConfig {
    pub codec: CodecConfig,
    pub migration: MigrationConfig,
}

impl StocklineConfig {
    /// Parses configuration text.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Loads configuration from a file.
    /// Falls back to defaults when the file is missing, unreadable, or invalid.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!(path = %path.display(), "no config file found, using defaults");
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded config");
                    config
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to parse config file, using defaults"
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read config file, using defaults");
                Self::default()
            }
        }
    }
}
