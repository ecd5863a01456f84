//! Error types for the render surface

use crate::tree::NodeId;
use dor_schema::SchemaError;
use thiserror::Error;

/// Errors raised while rendering or querying a render tree
#[derive(Debug, Error)]
pub enum FormError {
    /// Schema fault hit while rendering
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Node id does not belong to the tree it was used with
    #[error("Unknown render node {id} (tree holds {len} nodes)")]
    UnknownNode {
        /// Offending id
        id: NodeId,
        /// Nodes in the tree
        len: usize,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, FormError>;
