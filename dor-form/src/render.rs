//! Schema + document → render tree
//!
//! Reproduces the element structure of a schema-driven editor:
//!
//! - the root container has schema path `root`
//! - every object member and array item gets a container whose schema path
//!   is the parent path, a `.`, and the raw key
//! - scalars get a container holding one input named after the path
//! - `oneOf` / `anyOf` add a selector container; the chosen branch renders
//!   under it with the same schema path
//!
//! Branches are chosen with the same first-accepting-branch policy as
//! extraction. Every input is bound in the [`PointerIndex`] under the exact
//! pointer of its value.

use crate::error::Result;
use crate::index::PointerIndex;
use crate::tree::{NodeId, NodeKind, RenderNode, RenderTree};
use dor_pointer::form_path::{child_schema_path, schema_path_to_form_name};
use dor_pointer::{JsonPointer, ROOT_PATH};
use dor_schema::{SchemaError, SchemaEvaluator, SchemaNode};
use serde_json::Value;
use tracing::debug;

/// Rendered editor: the tree plus the pointer → input index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedForm {
    /// Node arena, root at [`RenderedForm::root`]
    pub tree: RenderTree,
    /// Exact pointer → input bindings
    pub index: PointerIndex,
}

impl RenderedForm {
    /// Root container, `None` only for an empty form
    pub fn root(&self) -> Option<NodeId> {
        self.tree.ids().next()
    }

    /// Input bound to `pointer`
    pub fn input_for_pointer(&self, pointer: &str) -> Option<NodeId> {
        self.index.lookup(pointer)
    }

    /// Value shown by the input bound to `pointer`
    pub fn value_at(&self, pointer: &str) -> Option<&Value> {
        self.tree.value(self.index.lookup(pointer)?)
    }
}

/// Renders documents into [`RenderedForm`]s
#[derive(Debug, Clone)]
pub struct FormRenderer {
    max_ref_depth: usize,
}

impl Default for FormRenderer {
    fn default() -> Self {
        Self { max_ref_depth: 64 }
    }
}

impl FormRenderer {
    /// Renderer following at most `max_ref_depth` consecutive `$ref`s at one
    /// value
    pub fn new(max_ref_depth: usize) -> Self {
        Self { max_ref_depth }
    }

    /// Render `document` as edited through `schema`
    pub fn render(&self, schema: &Value, document: &Value) -> Result<RenderedForm> {
        let mut pass = RenderPass {
            evaluator: SchemaEvaluator::new(schema, self.max_ref_depth)?,
            pointer: JsonPointer::root(),
            form: RenderedForm::default(),
        };
        pass.render_value(SchemaNode::root(schema), document, None, ROOT_PATH, 0)?;
        debug!(
            nodes = pass.form.tree.len(),
            inputs = pass.form.index.len(),
            "form rendered"
        );
        Ok(pass.form)
    }
}

struct RenderPass<'s> {
    evaluator: SchemaEvaluator<'s>,
    pointer: JsonPointer,
    form: RenderedForm,
}

impl<'s> RenderPass<'s> {
    fn render_value(
        &mut self,
        node: SchemaNode<'s>,
        instance: &Value,
        parent: Option<NodeId>,
        path: &str,
        ref_depth: usize,
    ) -> Result<()> {
        let reference = node
            .keywords()
            .and_then(|keywords| keywords.get("$ref"))
            .and_then(Value::as_str);
        if let Some(reference) = reference {
            if ref_depth >= self.evaluator.max_ref_depth() {
                return Err(SchemaError::RefDepthExceeded {
                    reference: reference.to_string(),
                    max_depth: self.evaluator.max_ref_depth(),
                }
                .into());
            }
            let target = self.evaluator.resolve_ref(reference)?;
            return self.render_value(target, instance, parent, path, ref_depth + 1);
        }

        let branches = ["oneOf", "anyOf"]
            .iter()
            .find_map(|keyword| node.branches(keyword));
        if let Some(branches) = branches {
            let selector = self.container(parent, NodeKind::Selector, path)?;
            match self.evaluator.first_valid_branch(&branches, instance)? {
                Some((idx, branch)) => {
                    debug!(pointer = %self.pointer, branch = idx, "rendering selected branch");
                    self.render_value(branch, instance, Some(selector), path, ref_depth)?;
                }
                None => debug!(pointer = %self.pointer, "no branch accepts instance"),
            }
            return Ok(());
        }

        match instance {
            Value::Object(members) => {
                let container = self.container(parent, NodeKind::Object, path)?;
                for (key, value) in members {
                    let sub = self.member_schema(&node, key)?;
                    self.descend(key, sub, value, container, path)?;
                }
                Ok(())
            }
            Value::Array(items) => {
                let container = self.container(parent, NodeKind::Array, path)?;
                for (idx, item) in items.iter().enumerate() {
                    let sub = item_schema_for(&node, idx);
                    self.descend(&idx.to_string(), sub, item, container, path)?;
                }
                Ok(())
            }
            scalar => {
                let container = self.container(parent, NodeKind::Scalar, path)?;
                let input = self.form.tree.add_node(
                    Some(container),
                    RenderNode::input(schema_path_to_form_name(path), scalar.clone()),
                )?;
                self.form.index.bind(self.pointer.to_string(), input);
                Ok(())
            }
        }
    }

    fn descend(
        &mut self,
        key: &str,
        node: SchemaNode<'s>,
        instance: &Value,
        parent: NodeId,
        parent_path: &str,
    ) -> Result<()> {
        let path = child_schema_path(parent_path, key);
        self.pointer.push(key);
        let outcome = self.render_value(node, instance, Some(parent), &path, 0);
        self.pointer.pop();
        outcome
    }

    fn container(&mut self, parent: Option<NodeId>, kind: NodeKind, path: &str) -> Result<NodeId> {
        self.form
            .tree
            .add_node(parent, RenderNode::container(kind, path))
    }

    /// Declared schema for member `key`, looking through `allOf` when the
    /// node itself says nothing
    fn member_schema(&mut self, node: &SchemaNode<'s>, key: &str) -> Result<SchemaNode<'s>> {
        if let Some(sub) = self.evaluator.member_schemas(node, key)?.into_iter().next() {
            return Ok(sub);
        }
        for part in node.branches("allOf").unwrap_or_default() {
            if let Some(sub) = self.evaluator.member_schemas(&part, key)?.into_iter().next() {
                return Ok(sub);
            }
        }
        Ok(SchemaNode::accept_all())
    }
}

fn item_schema_for<'s>(node: &SchemaNode<'s>, idx: usize) -> SchemaNode<'s> {
    node.item(idx)
        .or_else(|| {
            node.branches("allOf")?
                .into_iter()
                .find_map(|part| part.item(idx))
        })
        .unwrap_or_else(|| SchemaNode::accept_all())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_document_renders_root_input() {
        let form = FormRenderer::default()
            .render(&json!({"type": "string"}), &json!("hi"))
            .unwrap();
        let input = form.input_for_pointer("").unwrap();
        assert_eq!(form.tree.name(input), Some("root"));
        assert_eq!(form.value_at(""), Some(&json!("hi")));
        assert_eq!(form.root(), form.tree.parent(input));
    }

    #[test]
    fn nested_members_get_dotted_paths() {
        let schema = json!({"properties": {"a": {"properties": {"b": {"type": "string"}}}}});
        let form = FormRenderer::default()
            .render(&schema, &json!({"a": {"b": "x"}}))
            .unwrap();
        let input = form.input_for_pointer("/a/b").unwrap();
        assert_eq!(form.tree.name(input), Some("root[a][b]"));
        let container = form.tree.parent(input).unwrap();
        assert_eq!(form.tree.schema_path(container), Some("root.a.b"));
    }

    #[test]
    fn selector_shares_path_with_branch() {
        let schema = json!({"oneOf": [{"type": "integer"}, {"type": "string"}]});
        let form = FormRenderer::default().render(&schema, &json!("s")).unwrap();
        let input = form.input_for_pointer("").unwrap();
        let branch = form.tree.parent(input).unwrap();
        let selector = form.tree.parent(branch).unwrap();
        assert_eq!(form.tree.get(selector).unwrap().kind, NodeKind::Selector);
        assert_eq!(form.tree.schema_path(branch), form.tree.schema_path(selector));
    }

    #[test]
    fn unmatched_branches_render_only_the_selector() {
        let schema = json!({"properties": {"v": {"oneOf": [{"type": "integer"}]}}});
        let form = FormRenderer::default()
            .render(&schema, &json!({"v": "text"}))
            .unwrap();
        assert!(form.input_for_pointer("/v").is_none());
        assert_eq!(form.tree.len(), 2);
    }

    #[test]
    fn refs_and_undeclared_members_render() {
        let schema = json!({
            "definitions": {"item": {"type": "object", "properties": {"n": {"type": "number"}}}},
            "properties": {"list": {"type": "array", "items": {"$ref": "#/definitions/item"}}}
        });
        let document = json!({"list": [{"n": 1}, {"n": 2, "extra": true}], "loose": null});
        let form = FormRenderer::default().render(&schema, &document).unwrap();
        assert_eq!(form.value_at("/list/1/n"), Some(&json!(2)));
        assert_eq!(form.value_at("/list/1/extra"), Some(&json!(true)));
        assert_eq!(form.value_at("/loose"), Some(&Value::Null));
    }

    #[test]
    fn broken_ref_is_an_error() {
        let schema = json!({"properties": {"a": {"$ref": "#/missing"}}});
        assert!(FormRenderer::default()
            .render(&schema, &json!({"a": 1}))
            .is_err());
    }

    #[test]
    fn deep_recursive_documents_render() {
        let schema = json!({
            "type": "object",
            "properties": {"child": {"$ref": "#"}, "label": {"type": "string"}}
        });
        let mut document = json!({"label": "leaf"});
        for _ in 0..70 {
            document = json!({ "child": document });
        }
        let form = FormRenderer::new(4).render(&schema, &document).unwrap();
        let pointer = format!("{}/label", "/child".repeat(70));
        assert_eq!(form.value_at(&pointer), Some(&json!("leaf")));
    }

    #[test]
    fn lookahead_branch_is_selected() {
        let schema = json!({
            "properties": {
                "v": {"oneOf": [{"type": "string", "pattern": "^(?!tmp-)"}, {"type": "string"}]}
            }
        });
        let form = FormRenderer::default()
            .render(&schema, &json!({"v": "ok"}))
            .unwrap();
        assert_eq!(form.value_at("/v"), Some(&json!("ok")));
    }
}
