//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure. It is also compiled by the
//! build script to generate the manual page, so it depends only on `clap`
//! and `camino`.

use camino::Utf8PathBuf;
use clap::Parser;

/// Build file looked up when `--file` is not given.
pub const DEFAULT_BUILD_FILE: &str = "Tsumikifile";

/// A small make-style build tool: rebuild stale targets from a `Tsumikifile`.
#[derive(Debug, Parser, Clone, PartialEq, Eq)]
#[command(name = "tsumiki", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the build file to use.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "TSUMIKI_FILE",
        default_value = DEFAULT_BUILD_FILE
    )]
    pub file: Utf8PathBuf,

    /// Change to this directory before doing anything.
    #[arg(short = 'C', long, value_name = "DIR", env = "TSUMIKI_DIRECTORY")]
    pub directory: Option<Utf8PathBuf>,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the dependency graph in DOT format instead of building.
    #[arg(long)]
    pub graph: bool,

    /// Target to build; defaults to the first target in the build file.
    #[arg(value_name = "TARGET")]
    pub target: Option<String>,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            file: Utf8PathBuf::from(DEFAULT_BUILD_FILE),
            directory: None,
            verbose: false,
            graph: false,
            target: None,
        }
    }
}
