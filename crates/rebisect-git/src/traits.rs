//! Trait abstractions for git operations.
//!
//! This module defines the `GitOps` trait which abstracts git operations,
//! enabling dependency injection and testability.

use git2::Oid;

use crate::{RebaseOutcome, Result};

/// Trait for git repository operations.
///
/// This trait abstracts git operations, allowing for:
/// - Dependency injection in services
/// - Mock implementations that script rebase success and failure
///   without a real repository
///
/// Every call goes through an explicit repository handle; implementations
/// must not depend on the process working directory.
#[allow(clippy::missing_errors_doc)]
pub trait GitOps {
    // === Repository Info ===

    /// Get the current branch name.
    ///
    /// Returns an error if HEAD is detached or not on a branch.
    fn current_branch(&self) -> Result<String>;

    /// Get the short name of a local branch's configured upstream
    /// (for example `origin/main`).
    fn upstream_of(&self, branch: &str) -> Result<String>;

    /// Check if a rebase is in progress.
    fn is_rebasing(&self) -> bool;

    // === Commit Operations ===

    /// Resolve any revision (branch, remote branch, `name~3`) to a commit.
    fn resolve_commit(&self, rev: &str) -> Result<Oid>;

    /// Count commits on `remote`'s first-parent chain that `local` lacks.
    ///
    /// Every offset below the count is addressable as `remote~offset`.
    fn count_behind(&self, local: &str, remote: &str) -> Result<usize>;

    /// Count commits reachable from `local` but not from `remote`.
    fn count_ahead(&self, local: &str, remote: &str) -> Result<usize>;

    // === Working Directory ===

    /// Check for uncommitted changes to tracked files.
    ///
    /// Untracked files are ignored; they are handled by [`Self::clean_untracked`].
    fn has_uncommitted_changes(&self) -> Result<bool>;

    /// Remove untracked files and directories (`git clean -f -d`).
    fn clean_untracked(&self) -> Result<()>;

    // === Rebase Operations ===

    /// Rebase the current branch onto `target`.
    ///
    /// A conflicting rebase is not an error: it is reported through
    /// [`RebaseOutcome::success`] and the rebase is left in progress for the
    /// caller to abort or hand to the user.
    fn rebase(&self, target: &str) -> Result<RebaseOutcome>;

    /// Abort a rebase in progress.
    fn rebase_abort(&self) -> Result<()>;
}
