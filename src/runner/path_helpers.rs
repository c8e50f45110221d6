//! Path resolution helpers for the runner module.
//!
//! Centralises build-file and working-directory logic so the main runner
//! module stays focused on dispatch.

use camino::{Utf8Path, Utf8PathBuf};

use super::RunnerError;
use crate::cli::Cli;

/// Directory commands run in and file names are resolved against.
pub(super) fn resolve_workdir(cli: &Cli) -> Utf8PathBuf {
    cli.directory
        .clone()
        .unwrap_or_else(|| Utf8PathBuf::from("."))
}

/// Determine the build-file path, respecting the CLI's directory option.
///
/// Absolute `--file` values are used as given.
pub(super) fn resolve_build_file_path(cli: &Cli) -> Utf8PathBuf {
    match &cli.directory {
        Some(dir) => dir.join(&cli.file),
        None => cli.file.clone(),
    }
}

/// Fail with [`RunnerError::BuildFileNotFound`] unless `path` is a file.
pub(super) fn ensure_build_file_exists(cli: &Cli, path: &Utf8Path) -> Result<(), RunnerError> {
    if path.is_file() {
        return Ok(());
    }
    let name = path.file_name().unwrap_or(path.as_str()).to_owned();
    let directory = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .map_or_else(
            || "the current directory".to_owned(),
            |parent| format!("directory `{parent}`"),
        );
    let help = if cli.file.as_str() == crate::cli::DEFAULT_BUILD_FILE {
        format!("create a {name} here, or pass --file to use a different one")
    } else {
        format!("check the path given to --file; {path} does not exist")
    };
    Err(RunnerError::BuildFileNotFound {
        name,
        directory,
        path: path.to_owned(),
        help,
    })
}
