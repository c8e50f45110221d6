//! Staleness analysis and dependency-ordered execution.
//!
//! [`Engine::build`] walks the graph post-order from a root target. Each node
//! is stat'ed when first reached, its dependencies are resolved in
//! declaration order, and its commands run once any dependency turns out to
//! be missing or newer. The walk uses an explicit stack, so the depth of a
//! dependency chain is bounded only by memory.
//!
//! Before the walk starts, a separate analysis pass rejects cycles and
//! missing prerequisites so that neither can surface after commands have
//! already modified the workspace.
//!
//! # Examples
//!
//! ```no_run
//! use tsumiki::buildfile;
//! use tsumiki::engine::{Engine, Workspace};
//! use tsumiki::executor::ShellExecutor;
//!
//! let mut graph = buildfile::from_str("hello:\n\techo hi > hello\n")?;
//! let workspace = Workspace::new(".");
//! let mut executor = ShellExecutor::new(".", std::io::stdout());
//! let outcome = Engine::new(&mut graph, &workspace, &mut executor).build_named("hello")?;
//! assert!(!outcome.is_up_to_date());
//! # Ok::<(), miette::Report>(())
//! ```

mod error;
mod preflight;
mod timestamp;

pub use error::BuildError;
pub use timestamp::{Timestamp, Workspace};

use tracing::{debug, info};

use crate::executor::Executor;
use crate::graph::{NodeId, TargetGraph, VisitState};

/// Summary of one build.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BuildOutcome {
    root: String,
    commands_run: usize,
    rebuilt: Vec<String>,
}

impl BuildOutcome {
    /// Name of the requested target.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Number of commands executed across all targets.
    #[must_use]
    pub const fn commands_run(&self) -> usize {
        self.commands_run
    }

    /// Targets found stale, in the order they were brought up to date.
    #[must_use]
    pub fn rebuilt(&self) -> &[String] {
        &self.rebuilt
    }

    /// Whether the build ran no commands at all.
    #[must_use]
    pub const fn is_up_to_date(&self) -> bool {
        self.commands_run == 0
    }
}

struct Frame {
    node: NodeId,
    cursor: usize,
    resolved: Option<NodeId>,
}

impl Frame {
    const fn new(node: NodeId) -> Self {
        Self {
            node,
            cursor: 0,
            resolved: None,
        }
    }
}

/// Pick the node to build: the declared target `name`, or the first declared
/// target when no name is given.
///
/// # Errors
///
/// Returns [`BuildError::UnknownTarget`] if `name` is not a declared target
/// and [`BuildError::NoTargets`] if the graph declares none.
pub fn resolve_root(graph: &TargetGraph, name: Option<&str>) -> Result<NodeId, BuildError> {
    let Some(name) = name else {
        return graph.first_target().ok_or(BuildError::NoTargets);
    };
    graph
        .node_id(name)
        .filter(|id| graph.node(*id).is_declared_target())
        .ok_or_else(|| BuildError::UnknownTarget {
            name: name.to_owned(),
        })
}

/// Drives one build over a borrowed graph.
pub struct Engine<'a, E: ?Sized> {
    graph: &'a mut TargetGraph,
    workspace: &'a Workspace,
    executor: &'a mut E,
}

impl<'a, E: Executor + ?Sized> Engine<'a, E> {
    /// Prepare a build of `graph`, resolving files in `workspace` and running
    /// commands through `executor`.
    pub const fn new(
        graph: &'a mut TargetGraph,
        workspace: &'a Workspace,
        executor: &'a mut E,
    ) -> Self {
        Self {
            graph,
            workspace,
            executor,
        }
    }

    /// Resolve `name` and build it.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownTarget`] when `name` is not a declared
    /// target, otherwise any error from [`Engine::build`].
    pub fn build_named(&mut self, name: &str) -> Result<BuildOutcome, BuildError> {
        let root = resolve_root(self.graph, Some(name))?;
        self.build(root)
    }

    /// Build the first declared target in file order.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NoTargets`] for a graph without targets,
    /// otherwise any error from [`Engine::build`].
    pub fn build_default(&mut self) -> Result<BuildOutcome, BuildError> {
        let root = resolve_root(self.graph, None)?;
        self.build(root)
    }

    /// Bring `root` up to date.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::CyclicDependency`] or
    /// [`BuildError::MissingPrerequisite`] before any command runs, and
    /// [`BuildError::Command`] for the first command that fails. Commands
    /// already run are not undone.
    ///
    /// # Panics
    ///
    /// Panics if `root` belongs to a different graph.
    pub fn build(&mut self, root: NodeId) -> Result<BuildOutcome, BuildError> {
        preflight::analyse(self.graph, self.workspace, root)?;

        let mut outcome = BuildOutcome {
            root: self.graph.node(root).name().to_owned(),
            ..BuildOutcome::default()
        };
        if self.graph.node(root).visit_state() == VisitState::Done {
            return Ok(outcome);
        }

        let mut stack = vec![Frame::new(root)];
        self.enter(root, None)?;
        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            if let Some(dep) = frame.resolved.take() {
                self.compare(node, dep);
            }
            let Some(&dep) = self.graph.node(node).dependencies().get(frame.cursor) else {
                stack.pop();
                self.finish(node, &mut outcome)?;
                continue;
            };
            frame.cursor += 1;
            frame.resolved = Some(dep);
            match self.graph.node(dep).visit_state() {
                VisitState::Done => {}
                VisitState::InProgress => {
                    return Err(BuildError::CyclicDependency {
                        cycle: preflight::cycle_path(
                            self.graph,
                            stack.iter().map(|frame| frame.node),
                            dep,
                        ),
                    });
                }
                VisitState::Unvisited => {
                    self.enter(dep, Some(node))?;
                    stack.push(Frame::new(dep));
                }
            }
        }

        if outcome.is_up_to_date() {
            info!(root = outcome.root(), "up to date");
        } else {
            info!(
                root = outcome.root(),
                commands = outcome.commands_run(),
                "build finished"
            );
        }
        Ok(outcome)
    }

    fn enter(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<(), BuildError> {
        let modified = self.workspace.modified(self.graph.node(id).name())?;
        let node = self.graph.node_mut(id);
        node.visit_state = VisitState::InProgress;
        node.modified = modified;
        if modified.is_some() {
            return Ok(());
        }
        if node.is_declared_target() {
            debug!(name = node.name(), "target missing on disk");
            node.must_build = true;
            return Ok(());
        }
        let name = node.name().to_owned();
        let needed_by = parent
            .map(|parent| self.graph.node(parent).name().to_owned())
            .unwrap_or_default();
        Err(BuildError::MissingPrerequisite { name, needed_by })
    }

    fn compare(&mut self, id: NodeId, dep: NodeId) {
        if self.graph.node(id).must_build() {
            return;
        }
        let dep_time = self.graph.node(dep).modified_time();
        let node = self.graph.node(id);
        let stale = match (dep_time, node.modified_time()) {
            (None, _) => true,
            (Some(theirs), Some(own)) => theirs > own,
            (Some(_), None) => true,
        };
        if stale {
            debug!(
                name = node.name(),
                dependency = self.graph.node(dep).name(),
                "dependency is newer or missing",
            );
            self.graph.node_mut(id).must_build = true;
        }
    }

    fn finish(&mut self, id: NodeId, outcome: &mut BuildOutcome) -> Result<(), BuildError> {
        if self.graph.node(id).must_build() {
            let node = self.graph.node(id);
            for command in node.commands() {
                self.executor.execute(command)?;
                outcome.commands_run += 1;
            }
            outcome.rebuilt.push(node.name().to_owned());
            let refreshed = self.workspace.modified(node.name())?;
            if refreshed.is_some() {
                self.graph.node_mut(id).modified = refreshed;
            }
        }
        self.graph.node_mut(id).visit_state = VisitState::Done;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
