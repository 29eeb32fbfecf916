//! State persistence for the .git/rebisect/ directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bisect::{Offset, Outcome, ProbeStep};
use crate::config::Config;
use crate::error::{Error, Result};

/// Manages the .git/rebisect/ directory.
#[derive(Debug)]
pub struct State {
    /// Path to the .git/rebisect/ directory.
    dir: PathBuf,
}

impl State {
    /// File names within .git/rebisect/
    const CONFIG_FILE: &'static str = "config.toml";
    const LAST_RUN_FILE: &'static str = "last_run.json";

    /// Create a new State instance for the given git directory.
    ///
    /// # Errors
    /// Returns error if `git_dir` doesn't exist.
    pub fn new(git_dir: impl AsRef<Path>) -> Result<Self> {
        let git_dir = git_dir.as_ref();
        if !git_dir.is_dir() {
            return Err(Error::NotARepository);
        }

        Ok(Self {
            dir: git_dir.join("rebisect"),
        })
    }

    /// Get the path to the state directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // === Config operations ===

    fn config_path(&self) -> PathBuf {
        self.dir.join(Self::CONFIG_FILE)
    }

    /// Load the config, falling back to defaults when none is saved.
    ///
    /// # Errors
    /// Returns error if the config file exists but can't be parsed.
    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.config_path())
    }

    // === Run records ===

    fn last_run_path(&self) -> PathBuf {
        self.dir.join(Self::LAST_RUN_FILE)
    }

    /// Save a run record, replacing the previous one.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save_run(&self, record: &RunRecord) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(record)?;
        fs::write(self.last_run_path(), content)?;
        Ok(())
    }

    /// Load the most recent run record.
    ///
    /// # Errors
    /// Returns `NoRunRecorded` if nothing was saved, or a parse error.
    pub fn load_last_run(&self) -> Result<RunRecord> {
        let path = self.last_run_path();
        if !path.exists() {
            return Err(Error::NoRunRecorded);
        }

        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| Error::StateParseError {
            file: path,
            message: e.to_string(),
        })
    }
}

/// A completed search, as saved to `last_run.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run finished.
    pub finished_at: DateTime<Utc>,

    /// Local branch that was rebased.
    pub branch: String,

    /// Reference branch it was rebased onto.
    pub target: String,

    /// Branch tip before the first probe, for manual recovery.
    pub original_head: String,

    /// Commits the branch was behind `target` at the start.
    pub behind: usize,

    /// Conclusion of the run.
    pub outcome: Outcome,

    /// Offset the branch was left rebased onto, if any probe succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<Offset>,

    /// Every probe made, in order.
    pub trace: Vec<ProbeStep>,
}
