//! Arena of render nodes
//!
//! Mirrors the element tree a schema-driven editor produces: containers
//! carry a schema path (`data-schemapath`), inputs carry a form `name` and
//! the bound value. Nodes are never removed, so a [`NodeId`] stays valid
//! for the life of its tree.

use crate::error::{FormError, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Index of a node inside its [`RenderTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Editor that produced a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Object editor container
    Object,
    /// Array editor container
    Array,
    /// `oneOf` / `anyOf` selector container
    Selector,
    /// Scalar editor container
    Scalar,
    /// Input element bound to a scalar value
    Input,
}

/// One node of the render tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    /// Producing editor
    pub kind: NodeKind,
    /// Enclosing node, `None` for a tree root
    pub parent: Option<NodeId>,
    /// Child nodes in insertion order
    pub children: Vec<NodeId>,
    /// `data-schemapath` of a container
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<String>,
    /// `name` of an input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Value bound to an input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl RenderNode {
    /// Container node with a schema path
    pub fn container(kind: NodeKind, schema_path: impl Into<String>) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            schema_path: Some(schema_path.into()),
            name: None,
            value: None,
        }
    }

    /// Input node with a form name and value
    pub fn input(name: impl Into<String>, value: Value) -> Self {
        Self {
            kind: NodeKind::Input,
            parent: None,
            children: Vec::new(),
            schema_path: None,
            name: Some(name.into()),
            value: Some(value),
        }
    }
}

/// Node arena
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderTree {
    nodes: Vec<RenderNode>,
}

impl RenderTree {
    /// Empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append `node` under `parent` (or as a new root) and return its id
    pub fn add_node(&mut self, parent: Option<NodeId>, mut node: RenderNode) -> Result<NodeId> {
        if let Some(parent) = parent {
            self.node(parent)?;
        }
        let id = NodeId(self.nodes.len());
        node.parent = parent;
        node.children.clear();
        self.nodes.push(node);
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        Ok(id)
    }

    /// Node by id
    pub fn node(&self, id: NodeId) -> Result<&RenderNode> {
        self.nodes.get(id.0).ok_or_else(|| FormError::UnknownNode {
            id,
            len: self.nodes.len(),
        })
    }

    /// Node by id, `None` when unknown
    pub fn get(&self, id: NodeId) -> Option<&RenderNode> {
        self.nodes.get(id.0)
    }

    /// Parent of `id`
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// Children of `id` in insertion order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// Proper ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Proper descendants of `id` in document (pre-)order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// `data-schemapath` of `id`, if it is a container
    pub fn schema_path(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.schema_path.as_deref()
    }

    /// Form `name` of `id`, if it is an input
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.name.as_deref()
    }

    /// Bound value of `id`, if it is an input
    pub fn value(&self, id: NodeId) -> Option<&Value> {
        self.get(id)?.value.as_ref()
    }

    /// Closest node at or above `id` that carries a schema path
    pub fn closest_container(&self, id: NodeId) -> Option<NodeId> {
        if self.schema_path(id).is_some() {
            return Some(id);
        }
        self.ancestors(id).find(|&up| self.schema_path(up).is_some())
    }

    /// Ids of every node
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }
}

/// Iterator over proper ancestors, see [`RenderTree::ancestors`]
pub struct Ancestors<'t> {
    tree: &'t RenderTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
