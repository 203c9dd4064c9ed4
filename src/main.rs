//! CLI entry point for the HTTP stream dumper.

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};

mod app;
mod cli;

use app::{runtime, terminal};
use cli::Args;

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Stream finished or was stopped on request.
    Success,
    /// The dump failed.
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs).
    // Missing arguments exit here with a usage error, before any side effect.
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = terminal::resolve_default_log_level(args.quiet, args.verbose);
    terminal::init_tracing(default_level, terminal::is_no_color_requested());

    debug!(?args, "CLI arguments parsed");

    match runtime::run_dumper(args).await {
        Ok(exit) => exit.into(),
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
