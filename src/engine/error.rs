//! Error types for the build engine.

use camino::Utf8PathBuf;
use itertools::Itertools;
use miette::Diagnostic;
use thiserror::Error;

use crate::executor::CommandError;

/// Fatal conditions raised while bringing a target up to date.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    /// The requested root is not a declared target.
    #[error("make target `{name}` not found")]
    #[diagnostic(
        code(tsumiki::engine::unknown_target),
        help("declare it on the left of a `:` in the build file")
    )]
    UnknownTarget {
        /// Requested name.
        name: String,
    },

    /// The build file declares no targets, so there is nothing to default to.
    #[error("build file declares no targets")]
    #[diagnostic(code(tsumiki::engine::no_targets))]
    NoTargets,

    /// A dependency is neither a declared target nor an existing file.
    #[error("`{name}` is not a target and does not exist (needed by `{needed_by}`)")]
    #[diagnostic(
        code(tsumiki::engine::missing_prerequisite),
        help("create the file or declare a target that builds it")
    )]
    MissingPrerequisite {
        /// The missing prerequisite.
        name: String,
        /// Target that listed it.
        needed_by: String,
    },

    /// The dependency graph reachable from the root contains a cycle.
    #[error("dependency cycle detected: {}", render_cycle(.cycle))]
    #[diagnostic(code(tsumiki::engine::cyclic_dependency))]
    CyclicDependency {
        /// Names along the cycle; the first name is repeated at the end.
        cycle: Vec<String>,
    },

    /// Reading file metadata failed for a reason other than absence.
    #[error("failed to read metadata for {path}")]
    #[diagnostic(code(tsumiki::engine::stat))]
    Stat {
        /// File whose metadata was requested.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A command could not be run or exited unsuccessfully.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Command(#[from] CommandError),
}

fn render_cycle(cycle: &[String]) -> String {
    cycle.iter().join(" -> ")
}
