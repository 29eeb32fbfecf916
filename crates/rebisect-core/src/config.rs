//! Configuration management for rebisect.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// Rebisect configuration loaded from .git/rebisect/config.toml.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
}

impl Config {
    /// Load config from a TOML file.
    ///
    /// # Errors
    /// Returns error if file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

/// General rebisect settings.
#[derive(Debug, Clone, Deserialize)]
#[allow(clippy::struct_excessive_bools)] // Each setting maps to a CLI flag
pub struct GeneralConfig {
    /// Try a plain rebase onto the tip before bisecting.
    #[serde(default = "default_true")]
    pub try_tip_first: bool,

    /// Remove untracked files before every probe.
    #[serde(default)]
    pub clean_before_probe: bool,

    /// Save each completed search to `last_run.json`.
    #[serde(default = "default_true")]
    pub record_runs: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            try_tip_first: true,
            clean_before_probe: false,
            record_runs: true,
        }
    }
}

const fn default_true() -> bool {
    true
}
