//! Arena-backed command tree.
//!
//! Nodes live in a flat arena and reference each other through [`NodeId`]
//! indices, so child maps and parent back-references coexist without
//! reference cycles. The persisted snapshot omits parents; the registry
//! rebuilds them while loading.

use crate::spec::{ArgumentSpec, OptionSpec};
use std::collections::BTreeMap;

/// Handle to a node inside a [`NodeArena`].
///
/// Ids are only minted by [`NodeArena::alloc`] and nodes are never removed,
/// so an id stays valid for the lifetime of its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// One node of the command tree.
///
/// A node is a group (no handler key), a leaf (handler key, no children),
/// or a hybrid carrying both.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandNode {
    /// One lowercase path segment, e.g. `"seed"` in `make seed`.
    pub name: String,
    pub description: Option<String>,
    /// Stable handler id; `Some` makes the node executable.
    pub command: Option<String>,
    pub parent: Option<NodeId>,
    pub arguments: Vec<ArgumentSpec>,
    pub options: Vec<OptionSpec>,
    /// Children keyed by segment name.
    pub children: BTreeMap<String, NodeId>,
    /// Prompt template overrides, keyed by argument or option name.
    pub prompt_overrides: BTreeMap<String, String>,
    /// Extra placeholder values available to prompt templates.
    pub prompt_variables: BTreeMap<String, BTreeMap<String, String>>,
}

impl CommandNode {
    pub fn new(name: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            description: None,
            command: None,
            parent,
            arguments: Vec::new(),
            options: Vec::new(),
            children: BTreeMap::new(),
            prompt_overrides: BTreeMap::new(),
            prompt_variables: BTreeMap::new(),
        }
    }

    /// True when this node can be executed directly.
    pub fn is_leaf(&self) -> bool {
        self.command.is_some()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Flat storage for command tree nodes.
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<CommandNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: CommandNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &CommandNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut CommandNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
