//! Mock implementations for testing services.
//!
//! These mocks implement the traits from rebisect-git and rebisect-core
//! to enable unit testing of service logic without real git repos.

use std::cell::RefCell;
use std::str::FromStr;

use rebisect_core::config::Config;
use rebisect_core::state::RunRecord;
use rebisect_core::{Error as CoreError, Result as CoreResult, StateStore};
use rebisect_git::{Error as GitError, GitOps, Oid, RebaseOutcome, Result as GitResult};

/// Predicate deciding which offsets conflict.
type FailPredicate = Box<dyn Fn(usize) -> bool>;

/// Mock implementation of `GitOps` for testing.
///
/// Revisions are interpreted as `<target>~<offset>`; a bare name is offset
/// 0. By default every rebase succeeds.
pub struct MockGitOps {
    pub current_branch: RefCell<Option<String>>,
    pub upstream: RefCell<Option<String>>,
    pub behind: RefCell<usize>,
    pub ahead: RefCell<usize>,
    pub uncommitted: RefCell<bool>,
    pub rebasing: RefCell<bool>,
    pub fails: FailPredicate,
    pub interrupt_at: RefCell<Option<usize>>,
    pub rebase_error_at: RefCell<Option<usize>>,
    pub rebase_calls: RefCell<Vec<String>>,
    pub abort_calls: RefCell<usize>,
    pub clean_calls: RefCell<usize>,
    pub clean_fails: RefCell<bool>,
    pub missing_from: RefCell<Option<usize>>,
}

impl Default for MockGitOps {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGitOps {
    pub fn new() -> Self {
        Self {
            current_branch: RefCell::new(Some("feature".to_string())),
            upstream: RefCell::new(Some("origin/main".to_string())),
            behind: RefCell::new(0),
            ahead: RefCell::new(1),
            uncommitted: RefCell::new(false),
            rebasing: RefCell::new(false),
            fails: Box::new(|_| false),
            interrupt_at: RefCell::new(None),
            rebase_error_at: RefCell::new(None),
            rebase_calls: RefCell::new(Vec::new()),
            abort_calls: RefCell::new(0),
            clean_calls: RefCell::new(0),
            clean_fails: RefCell::new(false),
            missing_from: RefCell::new(None),
        }
    }

    /// Deterministic commit id for `offset`.
    #[allow(clippy::unwrap_used)]
    pub fn commit_for(offset: usize) -> Oid {
        Oid::from_str(&format!("{offset:040x}")).unwrap()
    }

    fn offset_of(rev: &str) -> usize {
        rev.rsplit_once('~')
            .and_then(|(_, n)| n.parse().ok())
            .unwrap_or(0)
    }

    pub fn with_behind(self, behind: usize) -> Self {
        *self.behind.borrow_mut() = behind;
        self
    }

    pub fn with_ahead(self, ahead: usize) -> Self {
        *self.ahead.borrow_mut() = ahead;
        self
    }

    pub fn with_upstream(self, upstream: Option<&str>) -> Self {
        *self.upstream.borrow_mut() = upstream.map(String::from);
        self
    }

    pub fn with_detached_head(self) -> Self {
        *self.current_branch.borrow_mut() = None;
        self
    }

    pub fn with_uncommitted_changes(self) -> Self {
        *self.uncommitted.borrow_mut() = true;
        self
    }

    pub fn with_rebase_in_progress(self) -> Self {
        *self.rebasing.borrow_mut() = true;
        self
    }

    pub fn with_failing(mut self, fails: impl Fn(usize) -> bool + 'static) -> Self {
        self.fails = Box::new(fails);
        self
    }

    pub fn with_interrupt_at(self, offset: usize) -> Self {
        *self.interrupt_at.borrow_mut() = Some(offset);
        self
    }

    pub fn with_clean_failure(self) -> Self {
        *self.clean_fails.borrow_mut() = true;
        self
    }

    /// Offsets from `offset` on name no commit.
    pub fn with_missing_commits_from(self, offset: usize) -> Self {
        *self.missing_from.borrow_mut() = Some(offset);
        self
    }

    fn is_missing(&self, offset: usize) -> bool {
        self.missing_from.borrow().is_some_and(|from| offset >= from)
    }

    pub fn with_rebase_error_at(self, offset: usize) -> Self {
        *self.rebase_error_at.borrow_mut() = Some(offset);
        self
    }
}

impl GitOps for MockGitOps {
    fn current_branch(&self) -> GitResult<String> {
        self.current_branch
            .borrow()
            .clone()
            .ok_or(GitError::DetachedHead)
    }

    fn upstream_of(&self, branch: &str) -> GitResult<String> {
        self.upstream
            .borrow()
            .clone()
            .ok_or_else(|| GitError::NoUpstream(branch.to_string()))
    }

    fn is_rebasing(&self) -> bool {
        *self.rebasing.borrow()
    }

    fn resolve_commit(&self, rev: &str) -> GitResult<Oid> {
        if self.current_branch.borrow().as_deref() == Some(rev) {
            return Ok(Self::commit_for(usize::MAX));
        }
        let offset = Self::offset_of(rev);
        if self.is_missing(offset) {
            return Err(GitError::RefNotFound(rev.to_string()));
        }
        Ok(Self::commit_for(offset))
    }

    fn count_behind(&self, _local: &str, _remote: &str) -> GitResult<usize> {
        Ok(*self.behind.borrow())
    }

    fn count_ahead(&self, _local: &str, _remote: &str) -> GitResult<usize> {
        Ok(*self.ahead.borrow())
    }

    fn has_uncommitted_changes(&self) -> GitResult<bool> {
        Ok(*self.uncommitted.borrow())
    }

    fn clean_untracked(&self) -> GitResult<()> {
        *self.clean_calls.borrow_mut() += 1;
        if *self.clean_fails.borrow() {
            return Err(GitError::Command {
                command: "clean -f -d".into(),
                message: "simulated failure".into(),
            });
        }
        Ok(())
    }

    fn rebase(&self, target: &str) -> GitResult<RebaseOutcome> {
        self.rebase_calls.borrow_mut().push(target.to_string());
        let offset = Self::offset_of(target);

        if *self.rebase_error_at.borrow() == Some(offset) {
            return Err(GitError::Command {
                command: format!("rebase {target}"),
                message: "simulated failure".into(),
            });
        }

        if *self.interrupt_at.borrow() == Some(offset) {
            *self.rebasing.borrow_mut() = true;
            return Ok(RebaseOutcome {
                success: false,
                interrupted: true,
                output: String::new(),
            });
        }

        if self.is_missing(offset) {
            return Ok(RebaseOutcome {
                success: false,
                interrupted: false,
                output: format!("fatal: invalid upstream '{target}'\n"),
            });
        }

        if (self.fails)(offset) {
            *self.rebasing.borrow_mut() = true;
            return Ok(RebaseOutcome {
                success: false,
                interrupted: false,
                output: format!("CONFLICT (content): could not apply onto {target}\n"),
            });
        }

        Ok(RebaseOutcome {
            success: true,
            interrupted: false,
            output: format!("Successfully rebased onto {target}\n"),
        })
    }

    fn rebase_abort(&self) -> GitResult<()> {
        *self.abort_calls.borrow_mut() += 1;
        *self.rebasing.borrow_mut() = false;
        Ok(())
    }
}

/// Mock implementation of `StateStore` for testing.
pub struct MockStateStore {
    pub config: RefCell<Config>,
    pub last_run: RefCell<Option<RunRecord>>,
}

impl Default for MockStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStateStore {
    pub fn new() -> Self {
        Self {
            config: RefCell::new(Config::default()),
            last_run: RefCell::new(None),
        }
    }
}

impl StateStore for MockStateStore {
    fn load_config(&self) -> CoreResult<Config> {
        Ok(self.config.borrow().clone())
    }

    fn save_run(&self, record: &RunRecord) -> CoreResult<()> {
        *self.last_run.borrow_mut() = Some(record.clone());
        Ok(())
    }

    fn load_last_run(&self) -> CoreResult<RunRecord> {
        self.last_run.borrow().clone().ok_or(CoreError::NoRunRecorded)
    }
}
