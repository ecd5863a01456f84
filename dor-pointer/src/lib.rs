//! DOR Pointer - RFC 6901 primitives for repository object editors
//!
//! This crate provides the pointer layer shared by the schema extractor and
//! the form surface, with no I/O dependencies. It includes:
//!
//! - Segment escaping and lenient unescaping
//! - Pointer navigation (get / replace) over `serde_json::Value`
//! - A parsed [`JsonPointer`] type with strict, limit-checked parsing
//! - Form identifiers (schema path and form name) derived from pointers
//! - Relative pointer expressions and deep-property helpers
//! - Error types

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod deep;
pub mod error;
pub mod form_path;
pub mod limits;
pub mod pointer;
pub mod relative;
pub mod segment;

// Re-export commonly used items
pub use deep::{get_deep_property, properties_named};
pub use error::{PointerError, Result};
pub use form_path::{pointer_to_form_path, FormPath, ROOT_PATH};
pub use limits::PointerLimits;
pub use pointer::{get_at_pointer, pointer_to_segments, replace_at_pointer, JsonPointer};
pub use relative::resolve_expression;
pub use segment::{decode_segment, encode_segment};
