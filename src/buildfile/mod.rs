//! Build-file loading.
//!
//! A build file is read line by line. Blank lines are ignored, tab-indented
//! lines are commands for the most recent target, and every other line
//! declares a target:
//!
//! ```text
//! prog: main.o util.o
//! 	cc -o prog main.o util.o
//!
//! main.o: main.c
//! 	cc -c main.c
//! ```
//!
//! Names may be referenced as dependencies before they are declared. A name
//! that is never declared stays a plain file in the resulting graph.

mod diagnostics;
mod line;

pub use diagnostics::{BuildFileError, MalformedKind};

use std::collections::HashMap;
use std::fs;

use camino::Utf8Path;
use miette::{NamedSource, SourceSpan};
use tracing::debug;

use crate::diagnostics::ResultExt;
use crate::graph::{DuplicateDependency, DuplicateTarget, NodeId, TargetGraph};
use line::{LineKind, SourceLine, TargetLine};

/// Display name used for build files parsed from strings.
pub const DEFAULT_NAME: &str = crate::cli::DEFAULT_BUILD_FILE;

/// Parse build-file text.
///
/// # Errors
///
/// Returns a [`BuildFileError`] if the text is malformed, declares a target
/// twice, repeats a dependency or declares no targets.
pub fn from_str(text: &str) -> Result<TargetGraph, BuildFileError> {
    from_str_named(text, DEFAULT_NAME)
}

/// Parse build-file text, naming it `name` in diagnostics.
///
/// # Errors
///
/// See [`from_str`].
pub fn from_str_named(text: &str, name: &str) -> Result<TargetGraph, BuildFileError> {
    let graph = Parser::new(text, name).run()?;
    debug!(
        file = name,
        nodes = graph.len(),
        targets = graph.iter().filter(|(_, node)| node.is_declared_target()).count(),
        "parsed build file"
    );
    Ok(graph)
}

/// Read and parse the build file at `path`.
///
/// The file is read in a single call, so no handle outlives this function.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails to parse.
pub fn from_path(path: impl AsRef<Utf8Path>) -> miette::Result<TargetGraph> {
    let path_ref = path.as_ref();
    let text = fs::read_to_string(path_ref).diag_with(|| format!("failed to read {path_ref}"))?;
    Ok(from_str_named(&text, path_ref.as_str())?)
}

struct Parser<'a> {
    text: &'a str,
    name: &'a str,
    graph: TargetGraph,
    current: Option<NodeId>,
    declared_at: HashMap<NodeId, SourceSpan>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, name: &'a str) -> Self {
        Self {
            text,
            name,
            graph: TargetGraph::default(),
            current: None,
            declared_at: HashMap::new(),
        }
    }

    fn run(mut self) -> Result<TargetGraph, BuildFileError> {
        for source_line in line::lines(self.text) {
            match line::classify(source_line.content) {
                LineKind::Blank | LineKind::Command(None) => {}
                LineKind::Command(Some(command)) => self.command(&source_line, command)?,
                LineKind::Target => self.target(&source_line)?,
            }
        }
        if self.graph.first_target().is_none() {
            return Err(BuildFileError::EmptyFile {
                name: self.name.to_owned(),
            });
        }
        Ok(self.graph)
    }

    fn command(
        &mut self,
        source_line: &SourceLine<'_>,
        command: &str,
    ) -> Result<(), BuildFileError> {
        let Some(target) = self.current else {
            return Err(BuildFileError::malformed(
                MalformedKind::CommandBeforeTarget,
                source_line.number,
                self.source(),
                source_line.span(),
            ));
        };
        self.graph.add_command(target, command);
        Ok(())
    }

    fn target(&mut self, source_line: &SourceLine<'_>) -> Result<(), BuildFileError> {
        let TargetLine { name, dependencies } = line::parse_target_line(source_line.content)
            .map_err(|(kind, start, len)| {
                BuildFileError::malformed(
                    kind,
                    source_line.number,
                    self.source(),
                    source_line.span_at(start, len),
                )
            })?;
        let name_span = source_line.span_at(name.offset, name.text.len());

        let id = self
            .graph
            .declare_target(name.text)
            .map_err(|DuplicateTarget { name: duplicate }| {
                let first = self
                    .graph
                    .node_id(&duplicate)
                    .and_then(|id| self.declared_at.get(&id).copied())
                    .unwrap_or(name_span);
                BuildFileError::DuplicateTarget {
                    name: duplicate,
                    line: source_line.number,
                    src: self.source(),
                    span: name_span,
                    first,
                }
            })?;
        self.declared_at.insert(id, name_span);
        self.current = Some(id);

        for dep in dependencies {
            self.graph.add_dependency(id, dep.text).map_err(
                |DuplicateDependency { target, dependency }| BuildFileError::DuplicateDependency {
                    target,
                    dependency,
                    line: source_line.number,
                    src: self.source(),
                    span: source_line.span_at(dep.offset, dep.text.len()),
                },
            )?;
        }
        Ok(())
    }

    fn source(&self) -> NamedSource<String> {
        NamedSource::new(self.name, self.text.to_owned())
    }
}
