//! Target graph data model.
//!
//! A [`TargetGraph`] owns every [`TargetNode`] named by a build file, whether
//! it was declared as a target or only mentioned as a dependency. Nodes are
//! stored in an insertion-ordered map so lookups by name are O(1) while the
//! file order stays available for choosing the default target and for
//! rendering.
//!
//! # Examples
//!
//! ```
//! use tsumiki::graph::TargetGraph;
//!
//! let mut graph = TargetGraph::default();
//! let app = graph.declare_target("app").expect("declare");
//! graph.add_dependency(app, "main.o").expect("edge");
//! graph.add_command(app, "cc -o app main.o");
//!
//! let node = graph.node(app);
//! assert!(node.is_declared_target());
//! assert_eq!(graph.first_target(), Some(app));
//! assert!(!graph.node(graph.node_id("main.o").expect("dep")).is_declared_target());
//! ```

pub mod dot;

use indexmap::IndexMap;
use indexmap::map::Entry;
use thiserror::Error;

use crate::engine::Timestamp;

/// Stable handle for a node inside one [`TargetGraph`].
///
/// Nodes are never removed, so an id stays valid for the lifetime of the
/// graph that issued it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in insertion order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Traversal state used for cycle detection.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum VisitState {
    /// Not reached by the current build.
    #[default]
    Unvisited,
    /// On the active traversal path.
    InProgress,
    /// Fully resolved for this build.
    Done,
}

/// One named build artifact or source file.
#[derive(Clone, Debug, Default)]
pub struct TargetNode {
    name: String,
    declared: bool,
    dependencies: Vec<NodeId>,
    commands: Vec<String>,
    pub(crate) visit_state: VisitState,
    pub(crate) must_build: bool,
    pub(crate) modified: Option<Timestamp>,
}

impl TargetNode {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    /// Name of the node, also the file it corresponds to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the name appeared on the left side of a target line.
    #[must_use]
    pub const fn is_declared_target(&self) -> bool {
        self.declared
    }

    /// Dependencies in declaration order.
    #[must_use]
    pub fn dependencies(&self) -> &[NodeId] {
        &self.dependencies
    }

    /// Commands in declaration order.
    #[must_use]
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Current traversal state.
    #[must_use]
    pub const fn visit_state(&self) -> VisitState {
        self.visit_state
    }

    /// Whether the last traversal decided this node was stale.
    #[must_use]
    pub const fn must_build(&self) -> bool {
        self.must_build
    }

    /// Whether the node's file was present at its last stat.
    #[must_use]
    pub const fn exists_on_disk(&self) -> bool {
        self.modified.is_some()
    }

    /// Modification time captured at the last stat, if the file existed.
    #[must_use]
    pub const fn modified_time(&self) -> Option<Timestamp> {
        self.modified
    }
}

/// A name appeared on the left side of two target lines.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("`{name}` is already declared as a target")]
pub struct DuplicateTarget {
    /// Name declared twice.
    pub name: String,
}

/// A target lists the same dependency twice.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("`{target}` already depends on `{dependency}`")]
pub struct DuplicateDependency {
    /// Target receiving the edge.
    pub target: String,
    /// Dependency listed twice.
    pub dependency: String,
}

/// Every node named by a build file.
#[derive(Clone, Debug, Default)]
pub struct TargetGraph {
    nodes: IndexMap<String, TargetNode>,
    first_target: Option<NodeId>,
}

impl TargetGraph {
    /// Number of nodes, declared or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by exact (case-sensitive) name.
    #[must_use]
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.nodes.get_index_of(name).map(NodeId)
    }

    /// Return the id for `name`, creating an undeclared node on first use.
    pub fn get_or_insert(&mut self, name: &str) -> NodeId {
        match self.nodes.entry(name.to_owned()) {
            Entry::Occupied(entry) => NodeId(entry.index()),
            Entry::Vacant(entry) => {
                let id = NodeId(entry.index());
                entry.insert(TargetNode::new(name));
                id
            }
        }
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different graph.
    #[must_use]
    #[expect(
        clippy::indexing_slicing,
        reason = "ids are only issued by the graph they index"
    )]
    pub fn node(&self, id: NodeId) -> &TargetNode {
        &self.nodes[id.0]
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "ids are only issued by the graph they index"
    )]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TargetNode {
        &mut self.nodes[id.0]
    }

    /// Mark `name` as a declared target.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateTarget`] if the name was already declared.
    pub fn declare_target(&mut self, name: &str) -> Result<NodeId, DuplicateTarget> {
        let id = self.get_or_insert(name);
        let node = self.node_mut(id);
        if node.declared {
            return Err(DuplicateTarget {
                name: name.to_owned(),
            });
        }
        node.declared = true;
        if self.first_target.is_none() {
            self.first_target = Some(id);
        }
        Ok(id)
    }

    /// Append a dependency edge from `target` to the node named `dependency`.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateDependency`] if the edge already exists.
    pub fn add_dependency(
        &mut self,
        target: NodeId,
        dependency: &str,
    ) -> Result<NodeId, DuplicateDependency> {
        let dep = self.get_or_insert(dependency);
        let node = self.node_mut(target);
        if node.dependencies.contains(&dep) {
            return Err(DuplicateDependency {
                target: node.name.clone(),
                dependency: dependency.to_owned(),
            });
        }
        node.dependencies.push(dep);
        Ok(dep)
    }

    /// Append a command to `target`.
    pub fn add_command(&mut self, target: NodeId, command: impl Into<String>) {
        self.node_mut(target).commands.push(command.into());
    }

    /// First declared target in file order.
    #[must_use]
    pub const fn first_target(&self) -> Option<NodeId> {
        self.first_target
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TargetNode)> {
        self.nodes
            .values()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx), node))
    }

    /// Clear every per-build field so the graph can be walked again.
    pub fn reset_traversal(&mut self) {
        for node in self.nodes.values_mut() {
            node.visit_state = VisitState::Unvisited;
            node.must_build = false;
            node.modified = None;
        }
    }
}
