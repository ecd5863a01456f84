//! JSON Pointer values and document navigation
//!
//! The free functions work directly on escaped pointer strings, the form in
//! which pointers travel through query parameters, form field names and map
//! keys. [`JsonPointer`] is the parsed, segment-oriented form.

use crate::error::PointerError;
use crate::limits::PointerLimits;
use crate::segment::{decode_segment, decode_segment_cow, encode_segment_cow, validate_escapes};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Split an escaped pointer into raw segments
///
/// The root pointer `""` yields no segments.
pub fn pointer_to_segments(pointer: &str) -> Vec<String> {
    pointer.split('/').skip(1).map(decode_segment).collect()
}

/// Resolve `pointer` against `document`
///
/// Returns `None` as soon as a segment misses. A present `null` resolves to
/// `Some(&Value::Null)`; stepping *through* a scalar or `null` is a miss.
pub fn get_at_pointer<'a>(document: &'a Value, pointer: &str) -> Option<&'a Value> {
    let mut node = document;
    for token in pointer.split('/').skip(1) {
        node = step(node, &decode_segment_cow(token))?;
    }
    Some(node)
}

/// Replace the existing value at `pointer`, returning the previous value
///
/// The root cannot be replaced, and nothing is inserted: if any segment
/// (including the last) is missing the document is left untouched and
/// `None` is returned.
pub fn replace_at_pointer(document: &mut Value, pointer: &str, value: Value) -> Option<Value> {
    if pointer.is_empty() {
        return None;
    }
    let tokens: Vec<Cow<'_, str>> = pointer.split('/').skip(1).map(decode_segment_cow).collect();
    let (last, parents) = tokens.split_last()?;

    let mut parent = document;
    for token in parents {
        parent = step_mut(parent, token)?;
    }
    let slot = step_mut(parent, last)?;
    Some(std::mem::replace(slot, value))
}

/// Parse a canonical array index (`0`, `17`; never `01`, `-` or `+1`)
pub fn parse_array_index(token: &str) -> Option<usize> {
    let canonical = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    if canonical {
        token.parse().ok()
    } else {
        None
    }
}

fn step<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(key),
        Value::Array(items) => items.get(parse_array_index(key)?),
        _ => None,
    }
}

fn step_mut<'a>(node: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    match node {
        Value::Object(map) => map.get_mut(key),
        Value::Array(items) => items.get_mut(parse_array_index(key)?),
        _ => None,
    }
}

/// A parsed JSON Pointer: an ordered list of raw (unescaped) segments
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsonPointer {
    segments: SmallVec<[String; 4]>,
}

impl JsonPointer {
    /// The root pointer (`""`)
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a pointer from raw segments
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse an escaped pointer without validation
    ///
    /// Malformed escapes pass through unchanged. A non-empty input that does
    /// not start with `/` is outside the contract; its text before the first
    /// `/` is ignored.
    pub fn from_escaped(pointer: &str) -> Self {
        Self::from_segments(pointer_to_segments(pointer))
    }

    /// Parse and validate an escaped pointer
    pub fn parse_strict(pointer: &str, limits: &PointerLimits) -> Result<Self, PointerError> {
        if pointer.len() > limits.max_pointer_length {
            return Err(PointerError::PointerTooLong {
                pointer: pointer.to_string(),
                length: pointer.len(),
                max_length: limits.max_pointer_length,
            });
        }

        if pointer.is_empty() {
            return Ok(Self::root());
        }

        if !pointer.starts_with('/') {
            return Err(PointerError::InvalidPointer {
                pointer: pointer.to_string(),
                reason: "Pointer must start with '/' (or be empty for root)".to_string(),
            });
        }

        let mut segments = SmallVec::new();
        for token in pointer.split('/').skip(1) {
            validate_escapes(token).map_err(|reason| PointerError::InvalidPointer {
                pointer: pointer.to_string(),
                reason,
            })?;
            segments.push(decode_segment(token));
        }

        if segments.len() > limits.max_depth {
            return Err(PointerError::DepthLimitExceeded {
                pointer: pointer.to_string(),
                depth: segments.len(),
                max_depth: limits.max_depth,
            });
        }

        Ok(Self { segments })
    }

    /// Raw segments, root first
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the root pointer
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Final segment, if any
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Append a raw segment
    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Remove and return the final segment
    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    /// Pointer with one more raw segment
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.push(segment);
        next
    }

    /// Pointer to the containing value; `None` for the root
    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.segments.split_last()?;
        Some(Self::from_segments(head.iter().cloned()))
    }

    /// Whether `prefix` is an ancestor-or-self of this pointer
    pub fn starts_with(&self, prefix: &JsonPointer) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Resolve against a document
    pub fn get<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(document, |node, segment| step(node, segment))
    }

    /// Replace the existing value at this pointer (see [`replace_at_pointer`])
    pub fn replace(&self, document: &mut Value, value: Value) -> Option<Value> {
        let (last, parents) = self.segments.split_last()?;
        let mut parent = document;
        for segment in parents {
            parent = step_mut(parent, segment)?;
        }
        let slot = step_mut(parent, last)?;
        Some(std::mem::replace(slot, value))
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            f.write_str("/")?;
            f.write_str(&encode_segment_cow(segment))?;
        }
        Ok(())
    }
}

impl FromStr for JsonPointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_strict(s, &PointerLimits::default())
    }
}

impl Serialize for JsonPointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JsonPointer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "": "empty key",
            "a/b": 1,
            "m~n": 2,
            "nested": {"list": [10, {"deep": null}]},
        })
    }

    #[test]
    fn segments_of_root_are_empty() {
        assert!(pointer_to_segments("").is_empty());
        assert_eq!(pointer_to_segments("/"), vec![String::new()]);
        assert_eq!(pointer_to_segments("/a~1b/m~0n"), vec!["a/b", "m~n"]);
    }

    #[test]
    fn get_root_returns_document() {
        let doc = sample();
        assert_eq!(get_at_pointer(&doc, ""), Some(&doc));
    }

    #[test]
    fn get_resolves_escaped_and_empty_keys() {
        let doc = sample();
        assert_eq!(get_at_pointer(&doc, "/"), Some(&json!("empty key")));
        assert_eq!(get_at_pointer(&doc, "/a~1b"), Some(&json!(1)));
        assert_eq!(get_at_pointer(&doc, "/m~0n"), Some(&json!(2)));
        assert_eq!(get_at_pointer(&doc, "/nested/list/0"), Some(&json!(10)));
    }

    #[test]
    fn get_distinguishes_null_from_absent() {
        let doc = sample();
        assert_eq!(
            get_at_pointer(&doc, "/nested/list/1/deep"),
            Some(&Value::Null)
        );
        assert_eq!(get_at_pointer(&doc, "/nested/list/1/deep/x"), None);
        assert_eq!(get_at_pointer(&doc, "/nested/missing"), None);
    }

    #[test]
    fn get_rejects_non_canonical_indices() {
        let doc = sample();
        assert_eq!(get_at_pointer(&doc, "/nested/list/01"), None);
        assert_eq!(get_at_pointer(&doc, "/nested/list/-"), None);
        assert_eq!(get_at_pointer(&doc, "/nested/list/2"), None);
    }

    #[test]
    fn replace_updates_existing_member() {
        let mut doc = sample();
        let previous = replace_at_pointer(&mut doc, "/nested/list/0", json!("ten"));
        assert_eq!(previous, Some(json!(10)));
        assert_eq!(get_at_pointer(&doc, "/nested/list/0"), Some(&json!("ten")));
    }

    #[test]
    fn replace_is_noop_for_root_and_missing() {
        let mut doc = sample();
        let before = doc.clone();
        assert_eq!(replace_at_pointer(&mut doc, "", json!(1)), None);
        assert_eq!(replace_at_pointer(&mut doc, "/nested/nope", json!(1)), None);
        assert_eq!(replace_at_pointer(&mut doc, "/nope/deeper", json!(1)), None);
        assert_eq!(doc, before);
    }

    #[test]
    fn parse_strict_validates() {
        let limits = PointerLimits::default();
        assert!(matches!(
            JsonPointer::parse_strict("data/field", &limits),
            Err(PointerError::InvalidPointer { .. })
        ));
        assert!(matches!(
            JsonPointer::parse_strict("/bad~2", &limits),
            Err(PointerError::InvalidPointer { .. })
        ));

        let tight = PointerLimits {
            max_depth: 2,
            max_pointer_length: 8,
        };
        assert!(matches!(
            JsonPointer::parse_strict("/a/b/c", &tight),
            Err(PointerError::DepthLimitExceeded { depth: 3, .. })
        ));
        assert!(matches!(
            JsonPointer::parse_strict("/abcdefghij", &tight),
            Err(PointerError::PointerTooLong { .. })
        ));
    }

    #[test]
    fn display_re_escapes_segments() {
        let pointer = JsonPointer::from_segments(["a/b", "", "~"]);
        assert_eq!(pointer.to_string(), "/a~1b//~0");
        assert_eq!(JsonPointer::root().to_string(), "");
        assert_eq!("/a~1b//~0".parse::<JsonPointer>().unwrap(), pointer);
    }

    #[test]
    fn parent_and_child_navigate() {
        let pointer = JsonPointer::from_escaped("/nested/list/1");
        assert_eq!(pointer.parent().unwrap().to_string(), "/nested/list");
        assert_eq!(pointer.child("deep").to_string(), "/nested/list/1/deep");
        assert!(pointer.starts_with(&JsonPointer::from_escaped("/nested")));
        assert!(JsonPointer::root().parent().is_none());
    }

    #[test]
    fn typed_pointer_get_and_replace() {
        let mut doc = sample();
        let pointer = JsonPointer::from_segments(["a/b"]);
        assert_eq!(pointer.get(&doc), Some(&json!(1)));
        assert_eq!(pointer.replace(&mut doc, json!(5)), Some(json!(1)));
        assert_eq!(pointer.get(&doc), Some(&json!(5)));
        assert_eq!(JsonPointer::root().replace(&mut doc, json!(0)), None);
    }

    #[test]
    fn serde_uses_string_form() {
        let pointer = JsonPointer::from_segments(["x", "0"]);
        let encoded = serde_json::to_string(&pointer).unwrap();
        assert_eq!(encoded, "\"/x/0\"");
        let decoded: JsonPointer = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, pointer);
        assert!(serde_json::from_str::<JsonPointer>("\"no-slash\"").is_err());
    }
}
