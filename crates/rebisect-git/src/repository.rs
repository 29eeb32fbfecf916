//! Repository wrapper providing high-level git operations.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use git2::{BranchType, ErrorCode, Oid, RepositoryState, StatusOptions};

use crate::error::{Error, Result};
use crate::traits::GitOps;

/// Result of a single `git rebase` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebaseOutcome {
    /// The rebase finished without conflicts.
    pub success: bool,
    /// The git process was killed by SIGINT.
    pub interrupted: bool,
    /// Combined stdout and stderr from git, untouched.
    pub output: String,
}

/// High-level wrapper around a git repository.
pub struct Repository {
    inner: git2::Repository,
}

impl Repository {
    /// Open a repository at the given path.
    ///
    /// # Errors
    /// Returns error if no repository found at path or any parent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let inner = git2::Repository::discover(path).map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                Error::NotARepository
            } else {
                Error::Git2(e)
            }
        })?;
        Ok(Self { inner })
    }

    /// Open the repository containing the current directory.
    ///
    /// # Errors
    /// Returns error if not inside a git repository.
    pub fn open_current() -> Result<Self> {
        Self::open(".")
    }

    /// Get the path to the repository root (workdir).
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.inner.workdir()
    }

    /// Get the path to the .git directory.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        self.inner.path()
    }

    /// Get the current repository state.
    #[must_use]
    pub fn state(&self) -> RepositoryState {
        self.inner.state()
    }

    /// Check if there's a rebase in progress.
    #[must_use]
    pub fn is_rebasing(&self) -> bool {
        matches!(
            self.state(),
            RepositoryState::Rebase
                | RepositoryState::RebaseInteractive
                | RepositoryState::RebaseMerge
        )
    }

    /// Fail with [`Error::RebaseInProgress`] if a rebase is already running.
    ///
    /// # Errors
    /// Returns `RebaseInProgress` if the repository is mid-rebase.
    pub fn require_not_rebasing(&self) -> Result<()> {
        if self.is_rebasing() {
            Err(Error::RebaseInProgress)
        } else {
            Ok(())
        }
    }

    // === Branch operations ===

    /// Get the name of the current branch.
    ///
    /// # Errors
    /// Returns error if HEAD is detached.
    pub fn current_branch(&self) -> Result<String> {
        let head = self.inner.head()?;
        if !head.is_branch() {
            return Err(Error::DetachedHead);
        }

        head.shorthand()
            .map(String::from)
            .ok_or(Error::DetachedHead)
    }

    /// Get the short name of a branch's upstream, e.g. `origin/main`.
    ///
    /// # Errors
    /// Returns `BranchNotFound` or `NoUpstream`.
    pub fn upstream_of(&self, branch_name: &str) -> Result<String> {
        let branch = self
            .inner
            .find_branch(branch_name, BranchType::Local)
            .map_err(|_| Error::BranchNotFound(branch_name.into()))?;

        let upstream = branch
            .upstream()
            .map_err(|_| Error::NoUpstream(branch_name.into()))?;

        upstream
            .name()?
            .map(String::from)
            .ok_or_else(|| Error::NoUpstream(branch_name.into()))
    }

    // === Commit operations ===

    /// Resolve a revision string to a commit id.
    ///
    /// # Errors
    /// Returns `RefNotFound` if the revision doesn't name a commit.
    pub fn resolve_commit(&self, rev: &str) -> Result<Oid> {
        self.inner
            .revparse_single(rev)
            .and_then(|object| object.peel_to_commit())
            .map(|commit| commit.id())
            .map_err(|_| Error::RefNotFound(rev.into()))
    }

    /// Count how many commits `local` is (ahead, behind) `remote`.
    ///
    /// # Errors
    /// Returns error if either side can't be resolved.
    pub fn ahead_behind(&self, local: &str, remote: &str) -> Result<(usize, usize)> {
        let local = self.resolve_commit(local)?;
        let remote = self.resolve_commit(remote)?;
        Ok(self.inner.graph_ahead_behind(local, remote)?)
    }

    /// Count commits on the first-parent chain of `remote` that `local`
    /// doesn't contain.
    ///
    /// `remote~n` names a commit for every `n` below the count, which
    /// `ahead_behind` doesn't guarantee once `remote` has merges.
    ///
    /// # Errors
    /// Returns error if either side can't be resolved.
    pub fn first_parent_behind(&self, local: &str, remote: &str) -> Result<usize> {
        let local = self.resolve_commit(local)?;
        let mut commit = self.inner.find_commit(self.resolve_commit(remote)?)?;
        let mut count = 0;

        loop {
            let id = commit.id();
            if id == local || self.inner.graph_descendant_of(local, id)? {
                return Ok(count);
            }
            count += 1;
            match commit.parents().next() {
                Some(parent) => commit = parent,
                None => return Ok(count),
            }
        }
    }

    // === Working directory state ===

    /// Check whether any tracked file has staged or unstaged changes.
    ///
    /// # Errors
    /// Returns error if status check fails.
    pub fn has_uncommitted_changes(&self) -> Result<bool> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);
        let statuses = self.inner.statuses(Some(&mut opts))?;
        Ok(!statuses.is_empty())
    }

    // === Subprocess operations ===

    fn run_git(&self, args: &[&str]) -> Result<Output> {
        let dir: PathBuf = self
            .workdir()
            .map_or_else(|| self.git_dir().to_path_buf(), Path::to_path_buf);

        tracing::debug!(args = ?args, dir = %dir.display(), "running git");

        Command::new("git")
            .args(args)
            .current_dir(&dir)
            .output()
            .map_err(|e| Error::Command {
                command: args.join(" "),
                message: e.to_string(),
            })
    }

    /// Rebase the current branch onto `target` using the git CLI.
    ///
    /// # Errors
    /// Returns error only if git could not be spawned. A conflicting
    /// rebase is reported as `success: false`.
    pub fn rebase(&self, target: &str) -> Result<RebaseOutcome> {
        let output = self.run_git(&["rebase", target])?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(RebaseOutcome {
            success: output.status.success(),
            interrupted: killed_by_interrupt(&output.status),
            output: text,
        })
    }

    /// Abort the rebase in progress, if any.
    ///
    /// # Errors
    /// Returns error if `git rebase --abort` fails.
    pub fn rebase_abort(&self) -> Result<()> {
        if !self.is_rebasing() {
            return Ok(());
        }

        let output = self.run_git(&["rebase", "--abort"])?;
        if output.status.success() {
            Ok(())
        } else {
            Err(Error::Command {
                command: "rebase --abort".into(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    /// Remove untracked files and directories.
    ///
    /// # Errors
    /// Returns error if `git clean` fails.
    pub fn clean_untracked(&self) -> Result<()> {
        let output = self.run_git(&["clean", "-f", "-d"])?;
        if output.status.success() {
            Ok(())
        } else {
            Err(Error::Command {
                command: "clean -f -d".into(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    // === Low-level access ===

    /// Get a reference to the underlying git2 repository.
    ///
    /// Use sparingly - prefer high-level methods.
    #[must_use]
    pub const fn inner(&self) -> &git2::Repository {
        &self.inner
    }
}

#[cfg(unix)]
fn killed_by_interrupt(status: &std::process::ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    const SIGINT: i32 = 2;
    status.signal() == Some(SIGINT)
}

#[cfg(not(unix))]
const fn killed_by_interrupt(_status: &std::process::ExitStatus) -> bool {
    false
}

impl GitOps for Repository {
    fn current_branch(&self) -> Result<String> {
        self.current_branch()
    }

    fn upstream_of(&self, branch: &str) -> Result<String> {
        self.upstream_of(branch)
    }

    fn is_rebasing(&self) -> bool {
        self.is_rebasing()
    }

    fn resolve_commit(&self, rev: &str) -> Result<Oid> {
        self.resolve_commit(rev)
    }

    fn count_behind(&self, local: &str, remote: &str) -> Result<usize> {
        self.first_parent_behind(local, remote)
    }

    fn count_ahead(&self, local: &str, remote: &str) -> Result<usize> {
        self.ahead_behind(local, remote).map(|(ahead, _)| ahead)
    }

    fn has_uncommitted_changes(&self) -> Result<bool> {
        self.has_uncommitted_changes()
    }

    fn clean_untracked(&self) -> Result<()> {
        self.clean_untracked()
    }

    fn rebase(&self, target: &str) -> Result<RebaseOutcome> {
        self.rebase(target)
    }

    fn rebase_abort(&self) -> Result<()> {
        self.rebase_abort()
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.git_dir())
            .finish()
    }
}
