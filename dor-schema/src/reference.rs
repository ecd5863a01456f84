//! Handle references and relationship edge labels
//!
//! A string field that holds the identifier of another digital object is
//! declared with
//! `{"<keyword>": {"type": {"handleReference": {"types": ["Person"], "name": "{{../name}}"}}}}`.
//! The `name` is either a literal label or a `{{expression}}` evaluated
//! relative to the field's pointer.

use crate::map::SchemaPointerMap;
use dor_pointer::{get_at_pointer, get_deep_property, resolve_expression};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

/// Handle-reference declaration read from an annotated subschema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleReference {
    /// Object types the reference may point to
    pub types: Vec<String>,
    /// Literal label or `{{expression}}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Repository the target lives in, when not local
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_repository: Option<String>,
}

impl HandleReference {
    /// Read `subschema[keyword].type.handleReference`
    ///
    /// `types` may be a single string or an array of strings.
    pub fn from_schema(subschema: &Value, keyword: &str) -> Option<Self> {
        let node = get_deep_property(subschema, &[keyword, "type", "handleReference"])?;
        let types = match node.get("types") {
            Some(Value::String(single)) => vec![single.clone()],
            Some(Value::Array(many)) => many
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };
        let text = |name: &str| {
            node.get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Some(Self {
            types,
            name: text("name"),
            remote_repository: text("remoteRepository"),
        })
    }

    /// Expression inside a `{{...}}` name
    pub fn name_expression(&self) -> Option<&str> {
        self.name
            .as_deref()?
            .strip_prefix("{{")?
            .strip_suffix("}}")
    }
}

/// Directed edge between two objects, created from a reference field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipEdge {
    /// Identifier of the object holding the reference
    pub from: String,
    /// Identifier the reference points to
    pub to: String,
    /// Pointer of the reference field inside `from`
    pub json_pointer: String,
    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl RelationshipEdge {
    /// Unlabelled edge
    pub fn new(from: impl Into<String>, to: impl Into<String>, json_pointer: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            json_pointer: json_pointer.into(),
            label: None,
        }
    }
}

/// Label `edge` from the handle reference declared at its pointer
///
/// Nothing happens unless the pointer's subschema declares a handle
/// reference with at least one type and the document value at the pointer
/// is `edge.to`. Returns whether the label was set.
pub fn label_edge(
    edge: &mut RelationshipEdge,
    document: &Value,
    map: &SchemaPointerMap<'_>,
    keyword: &str,
) -> bool {
    let pointer = edge.json_pointer.as_str();
    let Some(reference) = map
        .get(pointer)
        .and_then(|subschema| HandleReference::from_schema(subschema, keyword))
    else {
        trace!(pointer, "no handle reference at edge pointer");
        return false;
    };
    if reference.types.is_empty() {
        return false;
    }
    if get_at_pointer(document, pointer).and_then(Value::as_str) != Some(edge.to.as_str()) {
        trace!(pointer, to = %edge.to, "edge target does not match document");
        return false;
    }

    let label = match (&reference.name, reference.name_expression()) {
        (None, _) => Some(pointer.to_string()),
        (Some(_), Some(expression)) => {
            value_for_expression(document, pointer, expression).filter(|label| !label.is_empty())
        }
        (Some(literal), None) => Some(literal.clone()),
    };
    match label {
        Some(label) => {
            edge.label = Some(label);
            true
        }
        None => false,
    }
}

/// Text of the value `expression` designates relative to `pointer`
///
/// Strings come back verbatim, other values as compact JSON, and a missing
/// target or JSON `null` as `None`.
pub fn value_for_expression(document: &Value, pointer: &str, expression: &str) -> Option<String> {
    let target = resolve_expression(pointer, expression);
    match get_at_pointer(document, &target)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Unlabelled edges for every handle-reference field of `document` that
/// holds a string identifier, ordered by pointer
pub fn outgoing_references(
    from: &str,
    document: &Value,
    map: &SchemaPointerMap<'_>,
    keyword: &str,
) -> Vec<RelationshipEdge> {
    map.sorted()
        .into_iter()
        .filter(|(_, subschema)| HandleReference::from_schema(subschema, keyword).is_some())
        .filter_map(|(pointer, _)| {
            let to = get_at_pointer(document, pointer)?.as_str()?;
            Some(RelationshipEdge::new(from, to, pointer))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExtractorConfig, SchemaPointerExtractor};
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "properties": {
                "authors": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": {
                                "type": "string",
                                "repository": {"type": {"handleReference": {
                                    "types": ["Person"],
                                    "name": "{{../name}}"
                                }}}
                            },
                            "name": {"type": "string"}
                        }
                    }
                },
                "owner": {
                    "type": "string",
                    "repository": {"type": {"handleReference": {"types": "Person", "name": "owner"}}}
                },
                "related": {
                    "type": "string",
                    "repository": {"type": {"handleReference": {"types": ["Thing"]}}}
                },
                "untyped": {
                    "type": "string",
                    "repository": {"type": {"handleReference": {"name": "x"}}}
                }
            }
        })
    }

    fn document() -> Value {
        json!({
            "authors": [{"id": "p/1", "name": "Ada"}, {"id": "p/2"}],
            "owner": "p/3",
            "related": "t/9",
            "untyped": "u/1"
        })
    }

    fn labelled(edge_pointer: &str, to: &str) -> (bool, Option<String>) {
        let schema = schema();
        let document = document();
        let map = SchemaPointerExtractor::new(ExtractorConfig::default())
            .unwrap()
            .extract(&document, &schema)
            .unwrap();
        let mut edge = RelationshipEdge::new("obj/0", to, edge_pointer);
        let changed = label_edge(&mut edge, &document, &map, "repository");
        (changed, edge.label)
    }

    #[test]
    fn expression_name_reads_sibling() {
        assert_eq!(labelled("/authors/0/id", "p/1"), (true, Some("Ada".into())));
    }

    #[test]
    fn missing_expression_target_leaves_label_unset() {
        assert_eq!(labelled("/authors/1/id", "p/2"), (false, None));
    }

    #[test]
    fn literal_name_and_pointer_fallback() {
        assert_eq!(labelled("/owner", "p/3"), (true, Some("owner".into())));
        assert_eq!(labelled("/related", "t/9"), (true, Some("/related".into())));
    }

    #[test]
    fn mismatched_target_or_missing_types_do_nothing() {
        assert_eq!(labelled("/owner", "p/other"), (false, None));
        assert_eq!(labelled("/untyped", "u/1"), (false, None));
        assert_eq!(labelled("/nowhere", "p/3"), (false, None));
    }

    #[test]
    fn outgoing_references_lists_string_targets() {
        let schema = schema();
        let document = document();
        let map = SchemaPointerExtractor::default()
            .extract(&document, &schema)
            .unwrap();
        let edges = outgoing_references("obj/0", &document, &map, "repository");
        let pairs: Vec<_> = edges
            .iter()
            .map(|e| (e.json_pointer.as_str(), e.to.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("/owner", "p/3"),
                ("/related", "t/9"),
                ("/untyped", "u/1"),
                ("/authors/0/id", "p/1"),
                ("/authors/1/id", "p/2"),
            ]
        );
        assert!(edges.iter().all(|e| e.label.is_none()));
    }

    #[test]
    fn expression_values_are_stringified() {
        let document = json!({"a": {"n": 3, "o": {"k": true}, "z": null}});
        assert_eq!(value_for_expression(&document, "/a/id", "../n"), Some("3".into()));
        assert_eq!(
            value_for_expression(&document, "/a/id", "/a/o"),
            Some(r#"{"k":true}"#.into())
        );
        assert_eq!(value_for_expression(&document, "/a", "n"), Some("3".into()));
        assert_eq!(value_for_expression(&document, "/a", "z"), None);
    }

    #[test]
    fn handle_reference_parses_both_type_shapes() {
        let single = json!({"k": {"type": {"handleReference": {"types": "A", "remoteRepository": "r"}}}});
        let reference = HandleReference::from_schema(&single, "k").unwrap();
        assert_eq!(reference.types, vec!["A".to_string()]);
        assert_eq!(reference.remote_repository.as_deref(), Some("r"));
        assert_eq!(reference.name_expression(), None);

        let expr = HandleReference {
            name: Some("{{/title}}".into()),
            ..HandleReference::default()
        };
        assert_eq!(expr.name_expression(), Some("/title"));
    }
}
