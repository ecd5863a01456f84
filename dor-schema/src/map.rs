//! Pointer → subschema map produced by one extraction

use ahash::AHashMap;
use serde_json::{Map, Value};

/// Map from instance pointer (escaped string) to the annotated subschema
/// attributed to the value at that pointer
///
/// Entries borrow from the schema passed to
/// [`SchemaPointerExtractor::extract`](crate::SchemaPointerExtractor::extract).
/// Iteration order is unspecified; use [`sorted`](Self::sorted) for a
/// stable order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaPointerMap<'s> {
    entries: AHashMap<String, &'s Value>,
}

impl<'s> SchemaPointerMap<'s> {
    /// Empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `schema` for `pointer`, replacing any earlier attribution
    pub fn insert(&mut self, pointer: String, schema: &'s Value) -> Option<&'s Value> {
        self.entries.insert(pointer, schema)
    }

    /// Subschema attributed to `pointer`
    pub fn get(&self, pointer: &str) -> Option<&'s Value> {
        self.entries.get(pointer).copied()
    }

    /// Whether `pointer` has an entry
    pub fn contains(&self, pointer: &str) -> bool {
        self.entries.contains_key(pointer)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &'s Value)> + '_ {
        self.entries
            .iter()
            .map(|(pointer, schema)| (pointer.as_str(), *schema))
    }

    /// Entries ordered by pointer depth, then pointer text
    pub fn sorted(&self) -> Vec<(&str, &'s Value)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|(a, _), (b, _)| {
            pointer_depth(a)
                .cmp(&pointer_depth(b))
                .then_with(|| a.cmp(b))
        });
        entries
    }

    /// Owned JSON object `{pointer: subschema}`
    pub fn to_json(&self) -> Value {
        let object: Map<String, Value> = self
            .sorted()
            .into_iter()
            .map(|(pointer, schema)| (pointer.to_string(), schema.clone()))
            .collect();
        Value::Object(object)
    }
}

fn pointer_depth(pointer: &str) -> usize {
    pointer.matches('/').count()
}
