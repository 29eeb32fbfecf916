//! Command-line interface definition and command implementations.

use clap::Parser;
use clap_complete::Shell;

pub mod completions;
pub mod run;
pub mod show_last;
pub mod utils;

/// Rebase a diverged branch as far as it will go cleanly.
///
/// Bisects the commits the current branch is behind TARGET, rebasing onto
/// each candidate and aborting on conflict, until it finds the newest
/// commit the branch rebases onto cleanly and the first one that conflicts.
#[derive(Debug, Parser)]
#[command(name = "rebisect", version, about, long_about)]
#[allow(clippy::struct_excessive_bools)] // CLI options map directly to flags
pub struct Cli {
    /// Branch to rebase onto (defaults to the current branch's upstream).
    pub target: Option<String>,

    /// Skip the initial attempt to rebase straight onto the tip.
    #[arg(long)]
    pub skip_tip: bool,

    /// Stop in the conflicting rebase at the first failing commit.
    #[arg(long)]
    pub apply: bool,

    /// Remove untracked files (`git clean -f -d`) before every attempt.
    #[arg(long)]
    pub clean: bool,

    /// Do not save this run to .git/rebisect/last_run.json.
    #[arg(long)]
    pub no_record: bool,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Only print errors and essential output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Show the last recorded run and exit.
    #[arg(long, conflicts_with_all = ["target", "apply", "skip_tip", "clean", "no_record"])]
    pub show_last: bool,

    /// Print shell completions and exit.
    #[arg(long, value_name = "SHELL", exclusive = true)]
    pub completions: Option<Shell>,
}
