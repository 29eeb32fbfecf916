//! Error types for rebisect-core.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in rebisect-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The .git directory doesn't exist.
    #[error("not a git repository (or any parent up to mount point)")]
    NotARepository,

    /// The user interrupted a probe. The in-progress rebase was aborted.
    #[error("interrupted - rebase aborted")]
    Interrupted,

    /// No run has been recorded in this repository yet.
    #[error("no previous run recorded in this repository")]
    NoRunRecorded,

    /// State file parsing error.
    #[error("failed to parse {file}: {message}")]
    StateParseError { file: PathBuf, message: String },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Git operation error.
    #[error("git error: {0}")]
    Git(#[from] rebisect_git::Error),
}
