//! Application entry point.
//!
//! Parses command-line arguments and delegates execution to [`runner::run`].

use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt;
use tsumiki::{cli::Cli, runner};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let max_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    fmt()
        .with_max_level(max_level)
        .with_writer(io::stderr)
        .init();
    match runner::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            tracing::debug!(error = %report, "runner failed");
            if let Err(err) = writeln!(io::stderr().lock(), "{report:?}") {
                tracing::error!(error = %err, "failed to write error report");
            }
            ExitCode::FAILURE
        }
    }
}
