//! Analysis of the reachable graph before any command runs.
//!
//! The walk keeps its own visitation table so the node states used by the
//! build itself start out untouched.

use std::collections::HashMap;

use tracing::debug;

use super::{BuildError, Workspace};
use crate::graph::{NodeId, TargetGraph};

/// Tracks the visitation state of a node during analysis.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum VisitState {
    Visiting,
    Visited,
}

/// Walk everything reachable from `root`, failing on the first cycle or on
/// an undeclared dependency that is missing from disk.
pub(super) fn analyse(
    graph: &TargetGraph,
    workspace: &Workspace,
    root: NodeId,
) -> Result<(), BuildError> {
    let mut analyser = Analyser::new(graph, workspace);
    analyser.walk(root)
}

struct Frame {
    node: NodeId,
    cursor: usize,
}

struct Analyser<'a> {
    graph: &'a TargetGraph,
    workspace: &'a Workspace,
    stack: Vec<Frame>,
    states: HashMap<NodeId, VisitState>,
}

impl<'a> Analyser<'a> {
    fn new(graph: &'a TargetGraph, workspace: &'a Workspace) -> Self {
        Self {
            graph,
            workspace,
            stack: Vec::new(),
            states: HashMap::new(),
        }
    }

    fn walk(&mut self, root: NodeId) -> Result<(), BuildError> {
        self.enter(root);
        while let Some(frame) = self.stack.last_mut() {
            let node = frame.node;
            let Some(&dep) = self.graph.node(node).dependencies().get(frame.cursor) else {
                self.stack.pop();
                self.states.insert(node, VisitState::Visited);
                continue;
            };
            frame.cursor += 1;
            match self.states.get(&dep) {
                Some(VisitState::Visited) => {}
                Some(VisitState::Visiting) => return Err(self.cycle_error(dep)),
                None => {
                    self.check_prerequisite(node, dep)?;
                    self.enter(dep);
                }
            }
        }
        Ok(())
    }

    fn enter(&mut self, node: NodeId) {
        self.states.insert(node, VisitState::Visiting);
        self.stack.push(Frame { node, cursor: 0 });
    }

    fn check_prerequisite(&self, parent: NodeId, dep: NodeId) -> Result<(), BuildError> {
        let dep_node = self.graph.node(dep);
        if dep_node.is_declared_target() {
            return Ok(());
        }
        if self.workspace.modified(dep_node.name())?.is_some() {
            return Ok(());
        }
        debug!(
            missing = dep_node.name(),
            dependent = self.graph.node(parent).name(),
            "prerequisite is neither a target nor a file",
        );
        Err(BuildError::MissingPrerequisite {
            name: dep_node.name().to_owned(),
            needed_by: self.graph.node(parent).name().to_owned(),
        })
    }

    fn cycle_error(&self, dep: NodeId) -> BuildError {
        BuildError::CyclicDependency {
            cycle: cycle_path(self.graph, self.stack.iter().map(|frame| frame.node), dep),
        }
    }
}

/// Names along the cycle closed by an edge back to `reentered`, taken from the
/// active traversal `path`. The first name is repeated at the end.
pub(super) fn cycle_path(
    graph: &TargetGraph,
    path: impl Iterator<Item = NodeId>,
    reentered: NodeId,
) -> Vec<String> {
    let mut cycle: Vec<String> = path
        .skip_while(|node| *node != reentered)
        .map(|node| graph.node(node).name().to_owned())
        .collect();
    cycle.push(graph.node(reentered).name().to_owned());
    cycle
}
