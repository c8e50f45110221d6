//! CLI execution and command dispatch logic.
//!
//! This module keeps the binary's `main` minimal by encapsulating the steps
//! of a run: locating the build file, parsing it, choosing the root target and
//! then either printing the graph or building.

mod error;
mod path_helpers;

pub use error::RunnerError;

use std::io::{self, Write};

use miette::Result;
use tracing::debug;

use crate::buildfile;
use crate::cli::Cli;
use crate::diagnostics::ResultExt;
use crate::engine::{self, Engine, Workspace};
use crate::executor::ShellExecutor;
use crate::graph::dot;
use path_helpers::{ensure_build_file_exists, resolve_build_file_path, resolve_workdir};

/// Execute the parsed [`Cli`], writing to standard output.
///
/// # Errors
///
/// Returns an error if the build file is missing or invalid, the target is
/// unknown, or the build fails.
pub fn run(cli: &Cli) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with(cli, &mut out)
}

/// Execute the parsed [`Cli`], writing command echo and notices to `out`.
///
/// # Errors
///
/// See [`run`].
pub fn run_with<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let workdir = resolve_workdir(cli);
    let path = resolve_build_file_path(cli);
    ensure_build_file_exists(cli, &path)?;
    debug!(path = %path, workdir = %workdir, "loading build file");

    let mut graph = buildfile::from_path(&path)?;
    let root = engine::resolve_root(&graph, cli.target.as_deref())?;

    if cli.graph {
        out.write_all(dot::render(&graph).as_bytes())
            .diag("failed to write graph")?;
        return out.flush().diag("failed to flush output");
    }

    let workspace = Workspace::new(workdir.clone());
    let mut executor = ShellExecutor::new(workdir, &mut *out);
    let outcome = Engine::new(&mut graph, &workspace, &mut executor).build(root)?;
    if outcome.is_up_to_date() {
        writeln!(out, "{} is up to date.", outcome.root())
            .diag_with(|| format!("failed to report {}", outcome.root()))?;
    }
    Ok(())
}
