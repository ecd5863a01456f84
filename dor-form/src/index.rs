//! Pointer → input node table filled while rendering

use crate::tree::NodeId;
use ahash::AHashMap;

/// Exact pointer → input lookup
///
/// Unlike [`form_element_for_pointer`](crate::form_element_for_pointer),
/// which matches on derived names and can stay ambiguous when property
/// names contain `.`, this table is keyed by the escaped pointer itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerIndex {
    inputs: AHashMap<String, NodeId>,
}

impl PointerIndex {
    /// Empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `pointer` to `node`, returning any earlier binding
    pub fn bind(&mut self, pointer: String, node: NodeId) -> Option<NodeId> {
        self.inputs.insert(pointer, node)
    }

    /// Input bound to `pointer`
    pub fn lookup(&self, pointer: &str) -> Option<NodeId> {
        self.inputs.get(pointer).copied()
    }

    /// Number of bound pointers
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Whether nothing is bound
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Bindings ordered by node id, which is render order
    pub fn sorted(&self) -> Vec<(&str, NodeId)> {
        let mut bindings: Vec<_> = self
            .inputs
            .iter()
            .map(|(pointer, node)| (pointer.as_str(), *node))
            .collect();
        bindings.sort_by_key(|&(_, node)| node);
        bindings
    }
}
