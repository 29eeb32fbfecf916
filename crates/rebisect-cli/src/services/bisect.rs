//! Bisect service for incrementally rebasing onto a diverged branch.
//!
//! This service encapsulates the business logic for the main command,
//! accepting trait-based dependencies for testability.

use anyhow::{Result, bail};
use chrono::Utc;
use rebisect_core::bisect::{self, Bisection, Offset, Outcome, Probe, ProbeStep};
use rebisect_core::{Error as CoreError, RunRecord, StateStore, interrupt};
use rebisect_git::{GitOps, RebaseOutcome};

/// Configuration for a bisect run.
#[derive(Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)] // CLI options map directly to flags
pub struct BisectConfig {
    /// Try a plain rebase onto the tip before bisecting.
    pub try_tip_first: bool,
    /// Remove untracked files before every probe.
    pub clean_before_probe: bool,
    /// Leave the tree in the conflicting rebase at the first failure.
    pub apply: bool,
    /// Save the run to the state store.
    pub record_run: bool,
}

/// What a run will operate on.
#[derive(Debug, Clone)]
pub struct BisectPlan {
    pub branch: String,
    pub target: String,
    pub behind: usize,
    pub ahead: usize,
    pub original_head: String,
}

impl BisectPlan {
    /// Nothing to do: the branch already contains every target commit.
    #[must_use]
    pub const fn is_up_to_date(&self) -> bool {
        self.behind == 0
    }
}

/// Result of a bisect run.
#[derive(Debug, Clone)]
pub struct BisectResult {
    /// Search result. The trace includes the initial tip probe, if any.
    pub bisection: Bisection,
    /// Commit id at the first failing offset.
    pub first_failure_commit: Option<String>,
    /// Output of the rebase left in progress by `--apply`.
    pub applied: Option<RebaseOutcome>,
}

impl BisectResult {
    /// Offset the branch was left rebased onto, if any probe succeeded.
    #[must_use]
    pub fn settled_at(&self) -> Option<Offset> {
        self.bisection.settled_at()
    }
}

/// Format the revision for `offset` commits before the tip of `target`.
#[must_use]
pub fn revision(target: &str, offset: Offset) -> String {
    if offset == 0 {
        target.to_string()
    } else {
        format!("{target}~{offset}")
    }
}

/// Probe that rebases the current branch onto `target~offset`.
///
/// A conflicting or otherwise failed rebase is aborted before reporting
/// failure. An interrupt aborts the rebase and stops the search.
pub struct GitProbe<'a, G: GitOps, F: FnMut(&str, bool)> {
    repo: &'a G,
    target: &'a str,
    clean_before_probe: bool,
    progress: F,
}

impl<'a, G: GitOps, F: FnMut(&str, bool)> GitProbe<'a, G, F> {
    /// Create a probe against `target`.
    pub const fn new(repo: &'a G, target: &'a str, clean_before_probe: bool, progress: F) -> Self {
        Self {
            repo,
            target,
            clean_before_probe,
            progress,
        }
    }

    fn interrupted(&self) -> CoreError {
        if let Err(e) = self.repo.rebase_abort() {
            tracing::error!(error = %e, "failed to abort rebase after interrupt");
        }
        CoreError::Interrupted
    }
}

impl<G: GitOps, F: FnMut(&str, bool)> Probe for GitProbe<'_, G, F> {
    fn probe(&mut self, offset: Offset) -> rebisect_core::Result<bool> {
        if interrupt::is_interrupted() {
            return Err(self.interrupted());
        }

        let rev = revision(self.target, offset);

        if self.clean_before_probe {
            if let Err(e) = self.repo.clean_untracked() {
                tracing::warn!(rev = %rev, error = %e, "clean failed, treating as conflict");
                (self.progress)(&rev, false);
                return Ok(false);
            }
        }

        let succeeded = match self.repo.rebase(&rev) {
            Ok(outcome) if outcome.interrupted || interrupt::is_interrupted() => {
                return Err(self.interrupted());
            }
            Ok(outcome) if outcome.success => true,
            Ok(outcome) => {
                tracing::debug!(rev = %rev, output = %outcome.output, "rebase failed");
                self.repo.rebase_abort()?;
                false
            }
            Err(e) => {
                tracing::warn!(rev = %rev, error = %e, "rebase errored, treating as conflict");
                self.repo.rebase_abort()?;
                false
            }
        };

        (self.progress)(&rev, succeeded);
        Ok(succeeded)
    }
}

/// Service for bisect operations with trait-based dependencies.
pub struct BisectService<'a, G: GitOps> {
    repo: &'a G,
}

impl<'a, G: GitOps> BisectService<'a, G> {
    /// Create a new bisect service.
    #[must_use]
    pub const fn new(repo: &'a G) -> Self {
        Self { repo }
    }

    /// Resolve the branch and target, and count how far behind it is.
    pub fn create_plan(&self, target: Option<&str>) -> Result<BisectPlan> {
        if self.repo.is_rebasing() {
            bail!(rebisect_git::Error::RebaseInProgress);
        }

        let branch = self.repo.current_branch()?;
        let target = match target {
            Some(t) => t.to_string(),
            None => self.repo.upstream_of(&branch)?,
        };

        // Validate the target names a commit before anything else.
        self.repo.resolve_commit(&target)?;

        if self.repo.has_uncommitted_changes()? {
            bail!(rebisect_git::Error::DirtyWorkingDirectory);
        }

        let behind = self.repo.count_behind(&branch, &target)?;
        let ahead = self.repo.count_ahead(&branch, &target)?;
        let original_head = self.repo.resolve_commit(&branch)?.to_string();

        Ok(BisectPlan {
            branch,
            target,
            behind,
            ahead,
            original_head,
        })
    }

    /// Run the search and, optionally, stop at the first failing rebase.
    ///
    /// `progress` is called after every probe with the revision and whether
    /// it rebased cleanly.
    pub fn execute<S: StateStore>(
        &self,
        state: &S,
        plan: &BisectPlan,
        config: &BisectConfig,
        progress: &mut dyn FnMut(&str, bool),
    ) -> Result<BisectResult> {
        let started_at = Utc::now();
        let bisection = self.search(plan, config, progress)?;

        let first_failure_commit = bisection.first_failure().and_then(|offset| {
            let rev = revision(&plan.target, offset);
            match self.repo.resolve_commit(&rev) {
                Ok(oid) => Some(oid.to_string()),
                Err(e) => {
                    tracing::warn!(rev = %rev, error = %e, "could not resolve first failure");
                    None
                }
            }
        });

        let applied = match bisection.first_failure() {
            Some(offset) if config.apply => Some(self.apply(&plan.target, offset)?),
            _ => None,
        };

        if config.record_run {
            let record = RunRecord {
                started_at,
                finished_at: Utc::now(),
                branch: plan.branch.clone(),
                target: plan.target.clone(),
                original_head: plan.original_head.clone(),
                behind: plan.behind,
                outcome: bisection.outcome,
                settled_at: bisection.settled_at(),
                trace: bisection.trace.clone(),
            };
            if let Err(e) = state.save_run(&record) {
                tracing::warn!(error = %e, "failed to save run record");
            }
        }

        Ok(BisectResult {
            bisection,
            first_failure_commit,
            applied,
        })
    }

    fn search(
        &self,
        plan: &BisectPlan,
        config: &BisectConfig,
        progress: &mut dyn FnMut(&str, bool),
    ) -> Result<Bisection> {
        let mut probe = GitProbe::new(
            self.repo,
            &plan.target,
            config.clean_before_probe,
            progress,
        );

        let mut tip_step = None;
        if config.try_tip_first && plan.behind > 0 {
            let succeeded = probe.probe(0)?;
            if succeeded {
                return Ok(Bisection {
                    behind: plan.behind,
                    outcome: Outcome::CaughtUp,
                    trace: vec![ProbeStep {
                        offset: 0,
                        succeeded,
                    }],
                });
            }
            tip_step = Some(ProbeStep {
                offset: 0,
                succeeded,
            });
        }

        let mut bisection = bisect::search(plan.behind, &mut probe)?;

        if let Some(step) = tip_step {
            bisection.trace.insert(0, step);
            // The tip failed, so there is a failure even if every bisect
            // probe happened to succeed.
            if bisection.outcome == Outcome::CaughtUp {
                bisection.outcome = Outcome::FirstFailure { offset: 0 };
            }
        }

        Ok(bisection)
    }

    /// Rebase onto `target~offset` and leave any conflict in place.
    pub fn apply(&self, target: &str, offset: Offset) -> Result<RebaseOutcome> {
        let outcome = self.repo.rebase(&revision(target, offset))?;
        if outcome.interrupted || interrupt::is_interrupted() {
            self.repo.rebase_abort()?;
            return Err(CoreError::Interrupted.into());
        }
        Ok(outcome)
    }
}
