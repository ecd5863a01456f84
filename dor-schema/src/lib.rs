//! DOR Schema - annotation extraction over JSON Schema
//!
//! Given a document and the schema describing it, this crate finds every
//! subschema carrying the repository annotation keyword and records it
//! under the instance pointer it applies to. On top of that map it offers:
//!
//! - Preview projection of annotated fields
//! - Handle-reference discovery and relationship edge labels
//! - A full-document validation report

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod evaluate;
pub mod extractor;
pub mod map;
pub mod preview;
pub mod reference;
pub mod report;

// Re-export commonly used items
pub use config::{ExtractorConfig, DEFAULT_ANNOTATION_KEYWORD};
pub use error::{Result, SchemaError};
pub use evaluate::{SchemaEvaluator, SchemaNode};
pub use extractor::SchemaPointerExtractor;
pub use map::SchemaPointerMap;
pub use preview::{prettify_preview, preview_entries, PreviewAnnotation, PreviewEntry};
pub use reference::{
    label_edge, outgoing_references, value_for_expression, HandleReference, RelationshipEdge,
};
pub use report::{validate_document, ValidationIssue};
