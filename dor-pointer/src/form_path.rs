//! Render-surface identifiers derived from pointers
//!
//! A schema-driven form names its containers with a dotted *schema path*
//! (`root.a.b`) and its inputs with a bracketed *form name* (`root[a][b]`).
//! Both are lexical projections of a pointer, so property names that
//! contain `.` can make two pointers collide on the same identifiers.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Prefix every schema path starts with
pub const ROOT_PATH: &str = "root";

static DOTTED_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.([^.]+)").expect("valid static regex"));

/// Both render identifiers for one pointer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormPath {
    /// Container identifier (`data-schemapath`)
    pub schema_path: String,
    /// Input identifier (`name` attribute)
    pub form_name: String,
}

impl FormPath {
    /// Derive both identifiers from an escaped pointer
    pub fn from_pointer(pointer: &str) -> Self {
        let schema_path = pointer_to_schema_path(pointer);
        let form_name = schema_path_to_form_name(&schema_path);
        Self {
            schema_path,
            form_name,
        }
    }
}

/// Alias kept close to the codec vocabulary
pub fn pointer_to_form_path(pointer: &str) -> FormPath {
    FormPath::from_pointer(pointer)
}

/// `root` + pointer with `/` → `.`, then `~1` → `/`, then `~0` → `~`
pub fn pointer_to_schema_path(pointer: &str) -> String {
    let dotted = pointer.replace('/', ".").replace("~1", "/").replace("~0", "~");
    let mut path = String::with_capacity(ROOT_PATH.len() + dotted.len());
    path.push_str(ROOT_PATH);
    path.push_str(&dotted);
    path
}

/// Rewrite every `.X` run (X without dots) of a schema path as `[X]`
pub fn schema_path_to_form_name(schema_path: &str) -> String {
    DOTTED_RUN.replace_all(schema_path, "[${1}]").into_owned()
}

/// Form name for an escaped pointer
pub fn pointer_to_form_name(pointer: &str) -> String {
    schema_path_to_form_name(&pointer_to_schema_path(pointer))
}

/// Schema path of the child `key` under `parent_path`
pub fn child_schema_path(parent_path: &str, key: &str) -> String {
    let mut path = String::with_capacity(parent_path.len() + 1 + key.len());
    path.push_str(parent_path);
    path.push('.');
    path.push_str(key);
    path
}
