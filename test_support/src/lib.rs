//! Test utilities for build-tool scenarios.
//!
//! Tests create a [`Project`] in a temporary directory, write a build file
//! and source files into it, and pin modification times so staleness
//! decisions do not depend on how fast the test machine is.

pub mod project;

pub use project::{BUILD_FILE, Project, set_mtime};
