use anyhow::{Context, Result, bail};
use rebisect_core::State;
use rebisect_git::Repository;

use crate::output;

/// Helper to open repo and state.
pub fn open_repo_and_state() -> Result<(Repository, State)> {
    let repo = Repository::open_current().context("Not inside a git repository")?;
    repo.workdir().context("Cannot run in bare repository")?;
    let state = State::new(repo.git_dir())?;

    Ok((repo, state))
}

/// Ensure the repository is not in detached HEAD state.
/// If detached, prints the detached-HEAD error message and returns an error.
pub fn ensure_on_branch(repo: &Repository) -> Result<()> {
    if repo.inner().head_detached()? {
        output::error_detached_head();
        bail!("");
    }
    Ok(())
}
