//! Annotation extraction over a (document, schema) pair
//!
//! The extractor walks the schema against the instance the way a validator
//! would, tracking the instance pointer, and records every schema node that
//! carries the annotation keyword at the pointer it was applied to.
//!
//! Branch policy: for `anyOf` / `oneOf` the first branch in declaration
//! order that accepts the instance is walked; if none does, no branch is.
//! When several nodes are attributed to one pointer the last one visited
//! wins. Visit order per node: the node itself, `$ref`, `allOf`, `anyOf`,
//! `oneOf`, `if`/`then`/`else`, dependent schemas, then members or items.

use crate::config::ExtractorConfig;
use crate::error::{Result, SchemaError};
use crate::evaluate::{SchemaEvaluator, SchemaNode};
use crate::map::SchemaPointerMap;
use dor_pointer::JsonPointer;
use rayon::prelude::*;
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Builds [`SchemaPointerMap`]s
///
/// The extractor holds configuration only; every call owns its accumulator,
/// so one extractor can serve concurrent and nested calls.
#[derive(Debug, Clone, Default)]
pub struct SchemaPointerExtractor {
    config: ExtractorConfig,
}

impl SchemaPointerExtractor {
    /// Create an extractor, validating the configuration
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Map every annotated instance location of `document` to its subschema
    ///
    /// The document does not need to be valid. Errors come only from the
    /// schema (unresolvable `$ref`, bad pattern, a `$ref` cycle that never
    /// reaches a member or item).
    pub fn extract<'s>(&self, document: &Value, schema: &'s Value) -> Result<SchemaPointerMap<'s>> {
        let mut traversal = Traversal {
            config: &self.config,
            evaluator: SchemaEvaluator::new(schema, self.config.max_ref_depth)?,
            pointer: JsonPointer::root(),
        };
        let mut map = SchemaPointerMap::new();
        traversal.walk(SchemaNode::root(schema), document, 0, &mut map)?;
        debug!(
            keyword = %self.config.keyword,
            entries = map.len(),
            "schema pointer extraction finished"
        );
        Ok(map)
    }

    /// Extract independent pairs in parallel
    pub fn extract_many<'s>(
        &self,
        pairs: &[(&Value, &'s Value)],
    ) -> Vec<Result<SchemaPointerMap<'s>>> {
        pairs
            .par_iter()
            .map(|&(document, schema)| self.extract(document, schema))
            .collect()
    }
}

struct Traversal<'c, 's> {
    config: &'c ExtractorConfig,
    evaluator: SchemaEvaluator<'s>,
    pointer: JsonPointer,
}

impl<'c, 's> Traversal<'c, 's> {
    /// `ref_depth` counts consecutive `$ref` hops at the current instance
    /// location and restarts at zero for every member or item
    fn walk(
        &mut self,
        node: SchemaNode<'s>,
        instance: &Value,
        ref_depth: usize,
        map: &mut SchemaPointerMap<'s>,
    ) -> Result<()> {
        let Some(keywords) = node.keywords() else {
            return Ok(());
        };

        if self.is_tracked(keywords) {
            let pointer = self.pointer.to_string();
            trace!(pointer = %pointer, schema = %node.location, "recording annotated subschema");
            map.insert(pointer, node.schema);
        }

        if let Some(reference) = keywords.get("$ref").and_then(Value::as_str) {
            if ref_depth >= self.evaluator.max_ref_depth() {
                return Err(SchemaError::RefDepthExceeded {
                    reference: reference.to_string(),
                    max_depth: self.evaluator.max_ref_depth(),
                });
            }
            let target = self.evaluator.resolve_ref(reference)?;
            self.walk(target, instance, ref_depth + 1, map)?;
        }

        for sub in node.branches("allOf").unwrap_or_default() {
            self.walk(sub, instance, ref_depth, map)?;
        }

        for keyword in ["anyOf", "oneOf"] {
            let Some(branches) = node.branches(keyword) else {
                continue;
            };
            match self.evaluator.first_valid_branch(&branches, instance)? {
                Some((idx, branch)) => {
                    trace!(pointer = %self.pointer, keyword, branch = idx, "branch selected");
                    self.walk(branch, instance, ref_depth, map)?;
                }
                None => {
                    debug!(pointer = %self.pointer, keyword, "no branch accepts instance");
                }
            }
        }

        if let Some(condition) = node.at(&["if"]) {
            let next = if self.evaluator.is_valid(&condition, instance)? {
                node.at(&["then"])
            } else {
                node.at(&["else"])
            };
            if let Some(next) = next {
                self.walk(next, instance, ref_depth, map)?;
            }
        }

        match instance {
            Value::Object(members) => {
                self.walk_dependents(&node, instance, members, ref_depth, map)?;
                self.walk_members(&node, members, map)
            }
            Value::Array(items) => self.walk_items(&node, items, map),
            _ => Ok(()),
        }
    }

    fn walk_members(
        &mut self,
        node: &SchemaNode<'s>,
        members: &Map<String, Value>,
        map: &mut SchemaPointerMap<'s>,
    ) -> Result<()> {
        for (key, value) in members {
            for sub in self.evaluator.member_schemas(node, key)? {
                self.descend(key, sub, value, map)?;
            }
        }
        Ok(())
    }

    fn walk_items(
        &mut self,
        node: &SchemaNode<'s>,
        items: &[Value],
        map: &mut SchemaPointerMap<'s>,
    ) -> Result<()> {
        for (idx, item) in items.iter().enumerate() {
            if let Some(sub) = node.item(idx) {
                self.descend(&idx.to_string(), sub, item, map)?;
            }
        }
        Ok(())
    }

    fn walk_dependents(
        &mut self,
        node: &SchemaNode<'s>,
        instance: &Value,
        members: &Map<String, Value>,
        ref_depth: usize,
        map: &mut SchemaPointerMap<'s>,
    ) -> Result<()> {
        for keyword in ["dependencies", "dependentSchemas"] {
            let Some(dependents) = node
                .keywords()
                .and_then(|keywords| keywords.get(keyword))
                .and_then(Value::as_object)
            else {
                continue;
            };
            for (trigger, sub) in dependents {
                if !sub.is_object() || !members.contains_key(trigger) {
                    continue;
                }
                if let Some(sub) = node.at(&[keyword, trigger.as_str()]) {
                    self.walk(sub, instance, ref_depth, map)?;
                }
            }
        }
        Ok(())
    }

    fn descend(
        &mut self,
        segment: &str,
        node: SchemaNode<'s>,
        instance: &Value,
        map: &mut SchemaPointerMap<'s>,
    ) -> Result<()> {
        self.pointer.push(segment);
        let outcome = self.walk(node, instance, 0, map);
        self.pointer.pop();
        outcome
    }

    fn is_tracked(&self, keywords: &Map<String, Value>) -> bool {
        if keywords.contains_key(&self.config.keyword) {
            return true;
        }
        keywords
            .get("format")
            .and_then(Value::as_str)
            .is_some_and(|format| self.config.formats.iter().any(|f| f == format))
    }
}
