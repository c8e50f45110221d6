//! Error types for the runner module.

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors raised before the build file is parsed.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// The build file does not exist at the expected path.
    #[error("{name} not found in {directory}")]
    #[diagnostic(code(tsumiki::runner::build_file_not_found))]
    BuildFileNotFound {
        /// File name that was looked up (e.g. `Tsumikifile`).
        name: String,
        /// Human description of where it was looked up.
        directory: String,
        /// The path that was attempted.
        path: Utf8PathBuf,
        /// Hint for resolving the error.
        #[help]
        help: String,
    },
}
