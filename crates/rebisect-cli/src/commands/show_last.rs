//! `--show-last` - Print the most recently recorded run.

use anyhow::{Context, Result};
use rebisect_core::{Outcome, RunRecord, StateStore};

use crate::commands::utils;
use crate::output;
use crate::services::bisect::revision;

/// Run the show-last command.
pub fn run(json: bool) -> Result<()> {
    let (_repo, state) = utils::open_repo_and_state()?;
    show(&state, json)
}

fn show<S: StateStore>(state: &S, json: bool) -> Result<()> {
    let record = state
        .load_last_run()
        .context("Nothing to show - run rebisect first")?;

    if json {
        output::essential(&serde_json::to_string_pretty(&record)?);
    } else {
        for line in describe(&record) {
            output::detail(&line);
        }
    }
    Ok(())
}

/// Human-readable summary of a run record.
fn describe(record: &RunRecord) -> Vec<String> {
    let mut lines = vec![format!(
        "{} onto {} ({} behind) at {}",
        record.branch,
        record.target,
        record.behind,
        record.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    )];

    for step in &record.trace {
        lines.push(output::probe_line(
            &revision(&record.target, step.offset),
            step.succeeded,
        ));
    }

    match record.outcome {
        Outcome::CaughtUp => lines.push("Result: fully caught up".to_string()),
        Outcome::FirstFailure { offset } => lines.push(format!(
            "Result: first conflicting commit {}",
            revision(&record.target, offset)
        )),
    }

    if let Some(settled) = record.settled_at {
        lines.push(format!(
            "Left rebased onto {}",
            revision(&record.target, settled)
        ));
    }
    lines.push(format!(
        "Original head: {}",
        output::short_sha(&record.original_head)
    ));
    lines
}
