//! Error types for rebisect-git.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during git operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not inside a git repository.
    #[error("not a git repository")]
    NotARepository,

    /// Branch not found.
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    /// Branch has no configured upstream.
    #[error("branch '{0}' has no upstream - pass a target branch explicitly")]
    NoUpstream(String),

    /// Reference not found.
    #[error("reference not found: {0}")]
    RefNotFound(String),

    /// HEAD is detached (not on a branch).
    #[error("HEAD is detached - checkout a branch first")]
    DetachedHead,

    /// A rebase is already in progress.
    #[error("a rebase is already in progress - finish or abort it first")]
    RebaseInProgress,

    /// Working directory is dirty.
    #[error("working directory has uncommitted changes")]
    DirtyWorkingDirectory,

    /// A `git` subprocess could not be run or exited abnormally.
    #[error("`git {command}` failed: {message}")]
    Command {
        /// The git subcommand and arguments.
        command: String,
        /// stderr or spawn error.
        message: String,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying git2 error.
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),
}
