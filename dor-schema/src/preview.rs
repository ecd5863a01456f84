//! Preview projection of annotated fields
//!
//! A subschema opts into previews with
//! `{"<keyword>": {"preview": {"showInPreview": true, "isPrimary": true, "excludeTitle": false}}}`.
//! Flags use JSON truthiness, so `1` or `"yes"` count as set.

use crate::map::SchemaPointerMap;
use dor_pointer::{get_at_pointer, get_deep_property};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Preview flags read from an annotated subschema
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewAnnotation {
    /// Field is shown in previews at all
    pub show_in_preview: bool,
    /// Field is the preview headline
    pub is_primary: bool,
    /// Value is shown without its title
    pub exclude_title: bool,
}

impl PreviewAnnotation {
    /// Read `subschema[keyword].preview`, if present
    pub fn from_schema(subschema: &Value, keyword: &str) -> Option<Self> {
        let preview = get_deep_property(subschema, &[keyword, "preview"])?;
        let flag = |name: &str| preview.get(name).is_some_and(truthy);
        Some(Self {
            show_in_preview: flag("showInPreview"),
            is_primary: flag("isPrimary"),
            exclude_title: flag("excludeTitle"),
        })
    }
}

/// One field as shown in an object preview
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewEntry {
    /// Instance pointer of the field
    pub pointer: String,
    /// Subschema `title`, or the pointer when untitled
    pub title: String,
    /// Field value
    pub value: Value,
    /// Subschema declares `format: uri`
    pub is_uri: bool,
    /// Headline field (at most one per preview)
    pub is_primary: bool,
    /// Render without the title
    pub exclude_title: bool,
}

/// Project the preview fields of `document`
///
/// Entries come out ordered by pointer depth then pointer, and the first
/// `isPrimary` field in that order is the only one flagged primary. Fields
/// whose value is absent from the document are skipped.
pub fn preview_entries(
    document: &Value,
    map: &SchemaPointerMap<'_>,
    keyword: &str,
) -> Vec<PreviewEntry> {
    let mut found_primary = false;
    let mut entries = Vec::new();

    for (pointer, subschema) in map.sorted() {
        let Some(annotation) = PreviewAnnotation::from_schema(subschema, keyword) else {
            continue;
        };
        if !annotation.show_in_preview {
            continue;
        }
        let Some(value) = get_at_pointer(document, pointer) else {
            continue;
        };

        let title = subschema
            .get("title")
            .and_then(Value::as_str)
            .filter(|title| !title.is_empty())
            .unwrap_or(pointer)
            .to_string();
        let is_primary = annotation.is_primary && !found_primary;
        found_primary |= is_primary;

        entries.push(PreviewEntry {
            pointer: pointer.to_string(),
            title,
            value: value.clone(),
            is_uri: subschema.get("format").and_then(Value::as_str) == Some("uri"),
            is_primary,
            exclude_title: annotation.exclude_title,
        });
    }
    entries
}

/// Display text for a preview value: strings verbatim, everything else as
/// compact JSON, cut to `max_chars` characters with a `...` suffix
pub fn prettify_preview(value: &Value, max_chars: Option<usize>) -> String {
    let text = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    match max_chars {
        Some(limit) if text.chars().count() > limit => {
            let mut cut: String = text.chars().take(limit).collect();
            cut.push_str("...");
            cut
        }
        _ => text,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
