//! Full-document validation report

use crate::error::{Result, SchemaError};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// One validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Pointer of the failing instance value
    pub instance_pointer: String,
    /// Pointer of the failing keyword inside the schema
    pub schema_pointer: String,
    /// Human readable message
    pub message: String,
}

/// Validate `document` against `schema`, collecting every failure
///
/// An empty vector means the document is valid. A schema the validator
/// cannot compile is an error.
pub fn validate_document(schema: &Value, document: &Value) -> Result<Vec<ValidationIssue>> {
    let validator = jsonschema::validator_for(schema).map_err(|e| SchemaError::InvalidSchema {
        reason: e.to_string(),
    })?;
    let issues: Vec<ValidationIssue> = validator
        .iter_errors(document)
        .map(|e| ValidationIssue {
            instance_pointer: e.instance_path.to_string(),
            schema_pointer: e.schema_path.to_string(),
            message: e.to_string(),
        })
        .collect();
    debug!(issues = issues.len(), "document validated");
    Ok(issues)
}
