//! Default command - bisect and rebase onto the target branch.

use anyhow::Result;
use rebisect_core::bisect::{self, Offset, Outcome, ProbeStep};
use rebisect_core::Config;
use serde::Serialize;

use crate::commands::utils;
use crate::output;
use crate::services::bisect::revision;
use crate::services::{BisectConfig, BisectPlan, BisectResult, BisectService};

/// JSON output for a run.
#[derive(Debug, Serialize)]
struct RunOutput {
    status: RunStatus,
    branch: String,
    target: String,
    behind: usize,
    ahead: usize,
    original_head: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_failure: Option<Offset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_failure_commit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    settled_at: Option<Offset>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    probes: Vec<ProbeStep>,
    applied: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum RunStatus {
    UpToDate,
    CaughtUp,
    FirstFailure,
}

/// Options for the run command.
#[derive(Debug)]
#[allow(clippy::struct_excessive_bools)] // CLI options map directly to flags
pub struct RunOptions<'a> {
    pub target: Option<&'a str>,
    pub skip_tip: bool,
    pub apply: bool,
    pub clean: bool,
    pub no_record: bool,
    pub json: bool,
}

impl RunOptions<'_> {
    /// Merge flags over the repository config.
    fn bisect_config(&self, config: &Config) -> BisectConfig {
        BisectConfig {
            try_tip_first: config.general.try_tip_first && !self.skip_tip,
            clean_before_probe: config.general.clean_before_probe || self.clean,
            apply: self.apply,
            record_run: config.general.record_runs && !self.no_record,
        }
    }
}

/// Run the bisect-and-rebase command.
pub fn run(opts: &RunOptions<'_>) -> Result<()> {
    let (repo, state) = utils::open_repo_and_state()?;
    // HEAD is detached mid-rebase, so check this before the branch.
    repo.require_not_rebasing()?;
    utils::ensure_on_branch(&repo)?;

    let config = state.load_config()?;
    let bisect_config = opts.bisect_config(&config);
    tracing::debug!(?bisect_config, "resolved configuration");

    let service = BisectService::new(&repo);
    let plan = service.create_plan(opts.target)?;
    tracing::info!(
        branch = %plan.branch,
        target = %plan.target,
        behind = plan.behind,
        ahead = plan.ahead,
        "planned run"
    );

    if plan.is_up_to_date() {
        return output_up_to_date(opts, &plan);
    }

    print_start(opts, &plan, &bisect_config);

    let json = opts.json;
    let mut progress = |rev: &str, succeeded: bool| {
        if !json {
            output::detail(&output::probe_line(rev, succeeded));
        }
    };
    let result = service.execute(&state, &plan, &bisect_config, &mut progress)?;

    if opts.json {
        output_json(&plan, &result)
    } else {
        print_result(&plan, &result);
        Ok(())
    }
}

fn output_up_to_date(opts: &RunOptions<'_>, plan: &BisectPlan) -> Result<()> {
    if opts.json {
        let output = RunOutput {
            status: RunStatus::UpToDate,
            branch: plan.branch.clone(),
            target: plan.target.clone(),
            behind: 0,
            ahead: plan.ahead,
            original_head: plan.original_head.clone(),
            first_failure: None,
            first_failure_commit: None,
            settled_at: None,
            probes: vec![],
            applied: false,
        };
        output::essential(&serde_json::to_string_pretty(&output)?);
    } else {
        output::success(&format!(
            "'{}' is already up to date with '{}'",
            plan.branch, plan.target
        ));
    }
    Ok(())
}

fn print_start(opts: &RunOptions<'_>, plan: &BisectPlan, config: &BisectConfig) {
    if opts.json {
        return;
    }

    output::info(&format!(
        "'{}' is {} commit(s) behind '{}' ({} ahead)",
        plan.branch, plan.behind, plan.target, plan.ahead
    ));
    if config.try_tip_first {
        output::detail(&format!(
            "Trying '{}' first, then bisecting (at most {} more attempts)",
            plan.target,
            bisect::max_probes(plan.behind)
        ));
    } else {
        output::detail(&format!(
            "Bisecting (at most {} attempts)",
            bisect::max_probes(plan.behind)
        ));
    }
}

fn output_json(plan: &BisectPlan, result: &BisectResult) -> Result<()> {
    let status = match result.bisection.outcome {
        Outcome::CaughtUp => RunStatus::CaughtUp,
        Outcome::FirstFailure { .. } => RunStatus::FirstFailure,
    };
    let output = RunOutput {
        status,
        branch: plan.branch.clone(),
        target: plan.target.clone(),
        behind: plan.behind,
        ahead: plan.ahead,
        original_head: plan.original_head.clone(),
        first_failure: result.bisection.first_failure(),
        first_failure_commit: result.first_failure_commit.clone(),
        settled_at: result.settled_at(),
        probes: result.bisection.trace.clone(),
        applied: result.applied.is_some(),
    };
    output::essential(&serde_json::to_string_pretty(&output)?);

    if let Some(applied) = &result.applied {
        eprint!("{}", applied.output);
    }
    Ok(())
}

fn print_result(plan: &BisectPlan, result: &BisectResult) {
    output::hr();

    let Some(offset) = result.bisection.first_failure() else {
        output::success(&format!(
            "Rebased '{}' onto '{}' - fully caught up",
            plan.branch, plan.target
        ));
        return;
    };

    match result.settled_at() {
        Some(settled) => output::success(&format!(
            "Rebased '{}' onto '{}' ({} commit(s) behind the tip)",
            plan.branch,
            revision(&plan.target, settled),
            settled
        )),
        None => output::warn(&format!(
            "'{}' could not be rebased onto any probed commit of '{}'",
            plan.branch, plan.target
        )),
    }

    let commit = result
        .first_failure_commit
        .as_deref()
        .map(|sha| format!(" ({})", output::short_sha(sha)))
        .unwrap_or_default();
    output::warn(&format!(
        "First conflicting commit: {}{commit}",
        revision(&plan.target, offset)
    ));

    if let Some(applied) = &result.applied {
        output::hr();
        output::detail(applied.output.trim_end());
        output::hr();
        if applied.success {
            output::success(&format!(
                "Rebased onto '{}' without conflicts this time",
                revision(&plan.target, offset)
            ));
        } else {
            output::detail("Resolve conflicts, then run:");
            output::detail("  git add <resolved-files>");
            output::detail("  git rebase --continue");
            output::detail("  rebisect");
        }
    } else {
        output::detail("  Use --apply to stop at this commit and resolve the conflict");
    }

    output::detail(&format!(
        "  To restore the original branch: git reset --hard {}",
        plan.original_head
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> RunOptions<'static> {
        RunOptions {
            target: None,
            skip_tip: false,
            apply: false,
            clean: false,
            no_record: false,
            json: false,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config::default();

        let merged = opts().bisect_config(&config);
        assert!(merged.try_tip_first);
        assert!(!merged.clean_before_probe);
        assert!(merged.record_run);

        let merged = RunOptions {
            skip_tip: true,
            clean: true,
            no_record: true,
            apply: true,
            ..opts()
        }
        .bisect_config(&config);
        assert!(!merged.try_tip_first);
        assert!(merged.clean_before_probe);
        assert!(!merged.record_run);
        assert!(merged.apply);
    }

    #[test]
    fn test_config_disables_tip_probe() {
        let mut config = Config::default();
        config.general.try_tip_first = false;
        config.general.clean_before_probe = true;

        let merged = opts().bisect_config(&config);
        assert!(!merged.try_tip_first);
        assert!(merged.clean_before_probe);
    }

    #[test]
    fn test_json_status_names() {
        assert_eq!(
            serde_json::to_string(&RunStatus::FirstFailure).unwrap_or_default(),
            "\"first_failure\""
        );
        assert_eq!(
            serde_json::to_string(&RunStatus::UpToDate).unwrap_or_default(),
            "\"up_to_date\""
        );
    }
}
