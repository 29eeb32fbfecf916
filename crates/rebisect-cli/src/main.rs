//! rebisect - rebase a diverged branch as far as it will go cleanly.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;
mod services;

use commands::Cli;

/// Exit status for a run stopped by Ctrl-C, matching shell convention.
const EXIT_INTERRUPTED: u8 = 130;

/// Environment variable overriding the log filter.
const LOG_ENV: &str = "REBISECT_LOG";

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    output::set_quiet(cli.quiet);
    init_tracing(cli.verbose);

    let result = if let Some(shell) = cli.completions {
        commands::completions::run(shell)
    } else if cli.show_last {
        commands::show_last::run(cli.json)
    } else {
        rebisect_core::interrupt::install_handler();
        commands::run::run(&commands::run::RunOptions {
            target: cli.target.as_deref(),
            skip_tip: cli.skip_tip,
            apply: cli.apply,
            clean: cli.clean,
            no_record: cli.no_record,
            json: cli.json,
        })
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_interrupt(&e) => {
            output::error("Interrupted - the in-progress rebase was aborted");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            let msg = e.to_string();
            if !msg.is_empty() {
                output::error(&format!("{e:#}"));
            }
            ExitCode::FAILURE
        }
    }
}

fn is_interrupt(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<rebisect_core::Error>(),
            Some(rebisect_core::Error::Interrupted)
        )
    })
}
