//! Pointer ⇄ render node lookups
//!
//! These work purely from the attributes on the tree (schema paths and
//! form names), the way an editor page is queried. Names derived from
//! pointers can collide when property names contain `.`, so
//! [`form_element_for_pointer`] may return several nodes. The
//! [`PointerIndex`](crate::PointerIndex) built during rendering is exact.

use crate::error::Result;
use crate::tree::{NodeId, RenderTree};
use dor_pointer::form_path::pointer_to_schema_path;
use dor_pointer::segment::encode_segment;
use dor_pointer::{pointer_to_form_path, ROOT_PATH};
use tracing::trace;

/// Inputs under `scope` that display the value at `pointer`
///
/// Starts from every input whose `name` is the pointer's form name. While
/// two or more remain, a schema-path qualifier for the current pointer is
/// placed in front of the previous ones (a matched input must sit below
/// containers with those paths, outermost qualifier highest) and the
/// pointer loses its last segment. Stops once at most one input matches or
/// the qualifier for the root pointer has been applied.
pub fn form_element_for_pointer(
    tree: &RenderTree,
    scope: NodeId,
    pointer: &str,
) -> Result<Vec<NodeId>> {
    tree.node(scope)?;
    let name = pointer_to_form_path(pointer).form_name;
    let candidates: Vec<NodeId> = tree
        .descendants(scope)
        .into_iter()
        .filter(|&id| tree.name(id) == Some(name.as_str()))
        .collect();

    let mut matches = candidates.clone();
    // innermost first
    let mut qualifiers: Vec<String> = Vec::new();
    let mut current = pointer;
    while matches.len() >= 2 {
        qualifiers.push(pointer_to_schema_path(current));
        matches = candidates
            .iter()
            .copied()
            .filter(|&id| has_qualified_ancestors(tree, id, &qualifiers))
            .collect();
        trace!(pointer, qualifiers = qualifiers.len(), matches = matches.len(), "narrowed");
        if matches.len() <= 1 || current.is_empty() {
            break;
        }
        current = strip_last_segment(current);
    }
    Ok(matches)
}

/// Escaped pointer of the value `node` belongs to
///
/// Climbs to the closest container; the root container (or no container)
/// is the empty pointer. A container whose parent container has the same
/// schema path (a selector and its branch) adds no segment.
pub fn pointer_for_render_node(tree: &RenderTree, node: NodeId) -> Result<String> {
    tree.node(node)?;
    Ok(pointer_for_container(tree, tree.closest_container(node)))
}

fn pointer_for_container(tree: &RenderTree, container: Option<NodeId>) -> String {
    let Some(container) = container else {
        return String::new();
    };
    let path = tree.schema_path(container).unwrap_or(ROOT_PATH);
    if path == ROOT_PATH {
        return String::new();
    }
    let parent = tree
        .parent(container)
        .and_then(|up| tree.closest_container(up));
    let parent_path = parent.and_then(|up| tree.schema_path(up)).unwrap_or("");
    if path == parent_path {
        return pointer_for_container(tree, parent);
    }
    let key = path.get(parent_path.len() + 1..).unwrap_or("");
    let mut pointer = pointer_for_container(tree, parent);
    pointer.push('/');
    pointer.push_str(&encode_segment(key));
    pointer
}

/// Whether the ancestors of `id` contain containers matching `qualifiers`
/// in order, innermost qualifier nearest to `id`
fn has_qualified_ancestors(tree: &RenderTree, id: NodeId, qualifiers: &[String]) -> bool {
    let mut remaining = qualifiers.iter().peekable();
    for up in tree.ancestors(id) {
        let Some(wanted) = remaining.peek() else {
            break;
        };
        if tree.schema_path(up) == Some(wanted.as_str()) {
            remaining.next();
        }
    }
    remaining.peek().is_none()
}

fn strip_last_segment(pointer: &str) -> &str {
    pointer.rfind('/').map_or("", |idx| &pointer[..idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeKind, RenderNode};
    use serde_json::json;

    #[test]
    fn strip_removes_one_segment() {
        assert_eq!(strip_last_segment("/a/b"), "/a");
        assert_eq!(strip_last_segment("/a"), "");
        assert_eq!(strip_last_segment("/./"), "/.");
    }

    #[test]
    fn qualifiers_match_in_order() {
        let mut tree = RenderTree::new();
        let root = tree
            .add_node(None, RenderNode::container(NodeKind::Object, "root"))
            .unwrap();
        let x = tree
            .add_node(Some(root), RenderNode::container(NodeKind::Object, "x"))
            .unwrap();
        let y = tree
            .add_node(Some(x), RenderNode::container(NodeKind::Scalar, "y"))
            .unwrap();
        let input = tree
            .add_node(Some(y), RenderNode::input("n", json!(1)))
            .unwrap();

        let q = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert!(has_qualified_ancestors(&tree, input, &q(&["y", "x"])));
        assert!(has_qualified_ancestors(&tree, input, &q(&["y", "root"])));
        assert!(!has_qualified_ancestors(&tree, input, &q(&["x", "y"])));
    }

    #[test]
    fn node_without_container_maps_to_root_pointer() {
        let mut tree = RenderTree::new();
        let loose = tree.add_node(None, RenderNode::input("root", json!(1))).unwrap();
        assert_eq!(pointer_for_render_node(&tree, loose).unwrap(), "");
    }
}
