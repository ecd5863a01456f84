//! Branch acceptance backed by `jsonschema`
//!
//! Traversals only need a yes/no answer ("does this branch accept the
//! instance?"). Each subschema is compiled as `{"$ref": "<root>#<location>"}`
//! with the root schema registered as a resource, so local references inside
//! a branch resolve the same way they do for
//! [`validate_document`](crate::validate_document).
//!
//! Compiled validators are cached by schema location inside the evaluator,
//! so each extraction or render pass owns its own cache.

use crate::error::{Result, SchemaError};
use ahash::AHashMap;
use dor_pointer::{encode_segment, JsonPointer};
use jsonschema::{Draft, Resource, Validator};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{json, Map, Value};
use tracing::trace;

/// URI the root schema is registered under while compiling subschemas
pub const ROOT_SCHEMA_URI: &str = "urn:dor:root-schema";

/// Characters escaped inside one fragment segment
const FRAGMENT_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

static ACCEPT_ALL: Value = Value::Bool(true);

/// A subschema and where it sits inside the root schema document
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode<'s> {
    /// Pointer from the root schema to `schema`
    pub location: JsonPointer,
    /// The subschema
    pub schema: &'s Value,
}

impl<'s> SchemaNode<'s> {
    /// The root schema itself
    pub fn root(schema: &'s Value) -> Self {
        Self {
            location: JsonPointer::root(),
            schema,
        }
    }

    /// The `true` schema, used where nothing is declared
    pub fn accept_all() -> SchemaNode<'static> {
        SchemaNode {
            location: JsonPointer::root(),
            schema: &ACCEPT_ALL,
        }
    }

    /// Keywords, `None` for boolean schemas
    pub fn keywords(&self) -> Option<&'s Map<String, Value>> {
        self.schema.as_object()
    }

    /// Subschema reached through `path` (object keys or array indices)
    pub fn at(&self, path: &[&str]) -> Option<SchemaNode<'s>> {
        let mut location = self.location.clone();
        let mut schema = self.schema;
        for segment in path {
            schema = match schema {
                Value::Object(map) => map.get(*segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
            location.push(*segment);
        }
        Some(SchemaNode { location, schema })
    }

    /// Entries of the schema array under `keyword` (`allOf`, `oneOf`, ...)
    pub fn branches(&self, keyword: &str) -> Option<Vec<SchemaNode<'s>>> {
        let count = self.keywords()?.get(keyword)?.as_array()?.len();
        let branches = (0..count)
            .filter_map(|idx| {
                let idx = idx.to_string();
                self.at(&[keyword, idx.as_str()])
            })
            .collect();
        Some(branches)
    }

    /// Subschema for array position `idx`: `prefixItems` then `items`
    /// (2020-12), tuple `items` then `additionalItems` (drafts 4-2019), or a
    /// single `items`
    pub fn item(&self, idx: usize) -> Option<SchemaNode<'s>> {
        let keywords = self.keywords()?;
        let position = idx.to_string();
        if keywords.get("prefixItems").is_some_and(Value::is_array) {
            return self
                .at(&["prefixItems", position.as_str()])
                .or_else(|| self.at(&["items"]));
        }
        match keywords.get("items")? {
            Value::Array(_) => self
                .at(&["items", position.as_str()])
                .or_else(|| self.at(&["additionalItems"])),
            _ => self.at(&["items"]),
        }
    }
}

/// Yes/no evaluator bound to one root schema document
#[derive(Debug)]
pub struct SchemaEvaluator<'s> {
    root: &'s Value,
    draft: Draft,
    resource: Resource,
    max_ref_depth: usize,
    validators: AHashMap<String, Validator>,
    patterns: AHashMap<String, Validator>,
}

impl<'s> SchemaEvaluator<'s> {
    /// Create an evaluator for `root`, detecting its draft from `$schema`
    pub fn new(root: &'s Value, max_ref_depth: usize) -> Result<Self> {
        let draft = Draft::default()
            .detect(root)
            .map_err(|err| SchemaError::InvalidSchema {
                reason: err.to_string(),
            })?;
        Ok(Self {
            root,
            draft,
            resource: draft.create_resource(root.clone()),
            max_ref_depth,
            validators: AHashMap::new(),
            patterns: AHashMap::new(),
        })
    }

    /// Root schema document
    pub fn root(&self) -> &'s Value {
        self.root
    }

    /// Maximum consecutive `$ref` hops followed at one instance location
    pub fn max_ref_depth(&self) -> usize {
        self.max_ref_depth
    }

    /// Resolve a local `$ref` (`#`, `#/json/pointer` or `#anchor`)
    pub fn resolve_ref(&self, reference: &str) -> Result<SchemaNode<'s>> {
        let unresolved = || SchemaError::UnresolvedRef {
            reference: reference.to_string(),
        };
        let fragment = reference.strip_prefix('#').ok_or_else(unresolved)?;
        let fragment = percent_decode_str(fragment)
            .decode_utf8()
            .map_err(|_| unresolved())?;
        let location = if fragment.is_empty() {
            JsonPointer::root()
        } else if fragment.starts_with('/') {
            JsonPointer::from_escaped(&fragment)
        } else {
            find_anchor(self.root, &fragment).ok_or_else(unresolved)?
        };
        let schema = location.get(self.root).ok_or_else(unresolved)?;
        Ok(SchemaNode { location, schema })
    }

    /// Whether `instance` satisfies the subschema at `node`
    pub fn is_valid(&mut self, node: &SchemaNode<'s>, instance: &Value) -> Result<bool> {
        if let Value::Bool(accept) = node.schema {
            return Ok(*accept);
        }
        let key = node.location.to_string();
        if !self.validators.contains_key(&key) {
            let validator = self.compile(&node.location)?;
            self.validators.insert(key.clone(), validator);
        }
        Ok(self
            .validators
            .get(&key)
            .is_some_and(|validator| validator.is_valid(instance)))
    }

    /// First branch, in declaration order, that accepts `instance`
    pub fn first_valid_branch(
        &mut self,
        branches: &[SchemaNode<'s>],
        instance: &Value,
    ) -> Result<Option<(usize, SchemaNode<'s>)>> {
        for (idx, branch) in branches.iter().enumerate() {
            if self.is_valid(branch, instance)? {
                return Ok(Some((idx, branch.clone())));
            }
        }
        Ok(None)
    }

    /// Subschemas that apply to member `key`: `properties`, every matching
    /// `patternProperties` entry, else `additionalProperties`
    pub fn member_schemas(
        &mut self,
        node: &SchemaNode<'s>,
        key: &str,
    ) -> Result<Vec<SchemaNode<'s>>> {
        let mut applicable: Vec<_> = node.at(&["properties", key]).into_iter().collect();
        let patterns = node
            .keywords()
            .and_then(|keywords| keywords.get("patternProperties"))
            .and_then(Value::as_object);
        for pattern in patterns.into_iter().flat_map(|map| map.keys()) {
            if self.matches_pattern(pattern, key)? {
                applicable.extend(node.at(&["patternProperties", pattern]));
            }
        }
        if applicable.is_empty() {
            applicable.extend(node.at(&["additionalProperties"]));
        }
        Ok(applicable)
    }

    fn matches_pattern(&mut self, pattern: &str, text: &str) -> Result<bool> {
        if !self.patterns.contains_key(pattern) {
            let validator = jsonschema::options()
                .with_draft(self.draft)
                .build(&json!({ "pattern": pattern }))
                .map_err(|err| SchemaError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: err.to_string(),
                })?;
            self.patterns.insert(pattern.to_string(), validator);
        }
        let text = Value::String(text.to_string());
        Ok(self
            .patterns
            .get(pattern)
            .is_some_and(|validator| validator.is_valid(&text)))
    }

    fn compile(&self, location: &JsonPointer) -> Result<Validator> {
        let reference = schema_uri(location);
        trace!(%reference, "compiling subschema validator");
        jsonschema::options()
            .with_draft(self.draft)
            .with_resource(ROOT_SCHEMA_URI, self.resource.clone())
            .build(&json!({ "$ref": reference }))
            .map_err(|err| SchemaError::InvalidSchema {
                reason: format!("{reference}: {err}"),
            })
    }
}

/// URI of the subschema at `location` inside the registered root schema
pub fn schema_uri(location: &JsonPointer) -> String {
    let mut uri = String::from(ROOT_SCHEMA_URI);
    if location.is_root() {
        return uri;
    }
    uri.push('#');
    for segment in location.segments() {
        uri.push('/');
        uri.extend(utf8_percent_encode(&encode_segment(segment), FRAGMENT_SEGMENT));
    }
    uri
}

fn find_anchor(node: &Value, anchor: &str) -> Option<JsonPointer> {
    match node {
        Value::Object(map) => {
            let named = map.get("$anchor").and_then(Value::as_str) == Some(anchor)
                || ["$id", "id"].iter().any(|key| {
                    map.get(*key)
                        .and_then(Value::as_str)
                        .and_then(|id| id.strip_prefix('#'))
                        == Some(anchor)
                });
            if named {
                return Some(JsonPointer::root());
            }
            map.iter()
                .find_map(|(key, child)| Some(prefixed(key, find_anchor(child, anchor)?)))
        }
        Value::Array(items) => items.iter().enumerate().find_map(|(idx, child)| {
            Some(prefixed(&idx.to_string(), find_anchor(child, anchor)?))
        }),
        _ => None,
    }
}

fn prefixed(segment: &str, rest: JsonPointer) -> JsonPointer {
    let mut pointer = JsonPointer::root();
    pointer.push(segment);
    for inner in rest.segments() {
        pointer.push(inner.as_str());
    }
    pointer
}
