//! Key-path helpers over nested JSON objects

use serde_json::Value;

/// Walk nested object keys, returning `None` on the first miss or non-object
///
/// ```
/// use serde_json::json;
/// let schema = json!({"repository": {"type": {"handleReference": {"types": ["Person"]}}}});
/// let node = dor_pointer::get_deep_property(&schema, &["repository", "type", "handleReference"]);
/// assert_eq!(node, Some(&json!({"types": ["Person"]})));
/// ```
pub fn get_deep_property<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .try_fold(value, |node, key| node.as_object()?.get(*key))
}

/// Collect every member named `name`, at any depth
///
/// A matched member is not searched further. Arrays are searched element by
/// element.
pub fn properties_named<'a>(name: &str, value: &'a Value) -> Vec<&'a Value> {
    let mut found = Vec::new();
    collect_named(name, value, &mut found);
    found
}

fn collect_named<'a>(name: &str, value: &'a Value, found: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            for (key, member) in map {
                if key == name {
                    found.push(member);
                } else {
                    collect_named(name, member, found);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_named(name, item, found);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deep_property_stops_at_scalars() {
        let value = json!({"a": {"b": 3}});
        assert_eq!(get_deep_property(&value, &["a", "b"]), Some(&json!(3)));
        assert_eq!(get_deep_property(&value, &["a", "b", "c"]), None);
        assert_eq!(get_deep_property(&value, &["x"]), None);
        assert_eq!(get_deep_property(&value, &[]), Some(&value));
    }

    #[test]
    fn properties_named_searches_objects_and_arrays() {
        let value = json!({
            "format": "outer",
            "items": [{"format": "first"}, {"nested": {"format": "second"}}],
            "other": {"format": {"format": "hidden"}}
        });
        let mut found: Vec<_> = properties_named("format", &value)
            .into_iter()
            .cloned()
            .collect();
        found.sort_by_key(|v| v.to_string());
        assert_eq!(
            found,
            vec![
                json!("first"),
                json!("outer"),
                json!("second"),
                json!({"format": "hidden"}),
            ]
        );
    }
}
