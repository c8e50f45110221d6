//! Tsumiki core library.
//!
//! Tsumiki reads a make-style build file, links it into a [`graph::TargetGraph`]
//! and brings a target up to date by running the commands of every stale
//! target in dependency order.
//!
//! The pieces are usable on their own: [`buildfile`] parses text into a graph,
//! [`engine`] decides what is stale and drives an [`executor::Executor`], and
//! [`runner`] ties them to the command line described by [`cli::Cli`].

pub mod buildfile;
pub mod cli;
pub(crate) mod diagnostics;
pub mod engine;
pub mod executor;
pub mod graph;
pub mod runner;
