//! Shell command execution for stale targets.
//!
//! The [`Executor`] trait is the seam between the build engine and the
//! outside world. [`ShellExecutor`] echoes each command and then runs it
//! through the platform interpreter, blocking until it exits.

use std::io::{self, Write};
use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};
use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;

#[cfg(windows)]
pub(crate) const SHELL: &str = "cmd";
#[cfg(windows)]
pub(crate) const SHELL_ARGS: &[&str] = &["/C"];

#[cfg(not(windows))]
pub(crate) const SHELL: &str = "sh";
#[cfg(not(windows))]
pub(crate) const SHELL_ARGS: &[&str] = &["-c"];

/// Errors raised while running a single command.
#[derive(Debug, Error, Diagnostic)]
pub enum CommandError {
    /// The command ran and exited unsuccessfully.
    #[error("the command `{command}` failed{}", describe_code(.code))]
    #[diagnostic(code(tsumiki::executor::command_failed))]
    Failed {
        /// Command text as written in the build file.
        command: String,
        /// Exit code, or `None` when the process was terminated by a signal.
        code: Option<i32>,
    },

    /// The interpreter could not be started.
    #[error("failed to start the shell for `{command}`")]
    #[diagnostic(code(tsumiki::executor::spawn))]
    Spawn {
        /// Command text as written in the build file.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The command could not be echoed before running.
    #[error("failed to echo `{command}`")]
    #[diagnostic(code(tsumiki::executor::echo))]
    Echo {
        /// Command text as written in the build file.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl CommandError {
    /// Exit code of a failed command, if it exited normally.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Failed { code, .. } => *code,
            Self::Spawn { .. } | Self::Echo { .. } => None,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    code.map_or_else(
        || " (terminated by signal)".to_owned(),
        |value| format!(" with exit code {value}"),
    )
}

/// Runs the commands of stale targets.
#[cfg_attr(test, mockall::automock)]
pub trait Executor {
    /// Run `command` to completion.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] if the command cannot be run or exits
    /// unsuccessfully. The build stops at the first error.
    fn execute(&mut self, command: &str) -> Result<(), CommandError>;
}

/// Executes commands through `sh -c` (or `cmd /C` on Windows).
///
/// Each command is written to the echo writer, followed by a newline, before
/// it starts. The child inherits standard input, output and error.
#[derive(Debug)]
pub struct ShellExecutor<W> {
    workdir: Utf8PathBuf,
    echo: W,
}

impl<W: Write> ShellExecutor<W> {
    /// Create an executor running commands in `workdir` and echoing to `echo`.
    pub fn new(workdir: impl Into<Utf8PathBuf>, echo: W) -> Self {
        Self {
            workdir: workdir.into(),
            echo,
        }
    }

    /// Directory commands run in.
    #[must_use]
    pub fn workdir(&self) -> &Utf8Path {
        &self.workdir
    }

    /// Consume the executor, returning the echo writer.
    pub fn into_echo(self) -> W {
        self.echo
    }

    fn echo(&mut self, command: &str) -> io::Result<()> {
        writeln!(self.echo, "{command}")?;
        self.echo.flush()
    }
}

impl<W: Write> Executor for ShellExecutor<W> {
    fn execute(&mut self, command: &str) -> Result<(), CommandError> {
        self.echo(command).map_err(|source| CommandError::Echo {
            command: command.to_owned(),
            source,
        })?;

        let status = Command::new(SHELL)
            .args(SHELL_ARGS)
            .arg(command)
            .current_dir(&self.workdir)
            .status()
            .map_err(|source| CommandError::Spawn {
                command: command.to_owned(),
                source,
            })?;
        debug!(command, %status, "command finished");

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::Failed {
                command: command.to_owned(),
                code: status.code(),
            })
        }
    }
}
