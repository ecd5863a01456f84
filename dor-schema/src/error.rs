//! Error types for schema traversal

use dor_pointer::PointerError;
use thiserror::Error;

/// Errors raised while walking or validating against a schema
///
/// These are faults in the schema itself; a document that does not satisfy
/// the schema is never an error for extraction.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// `$ref` could not be resolved inside the schema document
    #[error(
        "Unresolved $ref '{reference}'.\n\
         \n\
         Only local references are supported: '#', '#/json/pointer' or '#anchor'."
    )]
    UnresolvedRef {
        /// The reference as written in the schema
        reference: String,
    },

    /// `$ref` chain nested deeper than the configured limit
    #[error("$ref nesting exceeded {max_depth} levels while resolving '{reference}'")]
    RefDepthExceeded {
        /// Reference being followed when the limit was hit
        reference: String,
        /// Configured maximum
        max_depth: usize,
    },

    /// `patternProperties` key is not a valid regular expression
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Offending pattern
        pattern: String,
        /// Compilation error reported by the validator
        reason: String,
    },

    /// Schema document is structurally unusable
    #[error("Invalid schema: {reason}")]
    InvalidSchema {
        /// What is wrong with it
        reason: String,
    },

    /// Pointer supplied by the caller is malformed
    #[error(transparent)]
    Pointer(#[from] PointerError),

    /// Extractor configuration is unusable
    #[error("Invalid extractor configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with it
        reason: String,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SchemaError>;
