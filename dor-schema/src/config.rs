//! Extractor configuration

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};

/// Keyword that marks subschemas of interest to the editor
pub const DEFAULT_ANNOTATION_KEYWORD: &str = "repository";

/// Hard ceiling for `max_ref_depth`
pub const HARD_MAX_REF_DEPTH: usize = 1_024;

/// Options for [`SchemaPointerExtractor`](crate::SchemaPointerExtractor)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Annotation keyword to record
    pub keyword: String,
    /// `format` values that are recorded as if annotated (e.g. `"file"`)
    pub formats: Vec<String>,
    /// Maximum `$ref` nesting followed along one path
    pub max_ref_depth: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            keyword: DEFAULT_ANNOTATION_KEYWORD.to_string(),
            formats: Vec::new(),
            max_ref_depth: 64,
        }
    }
}

impl ExtractorConfig {
    /// Default configuration with a different annotation keyword
    pub fn with_keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Self::default()
        }
    }

    /// Also record nodes with the given `format`
    pub fn track_format(mut self, format: impl Into<String>) -> Self {
        self.formats.push(format.into());
        self
    }

    /// Check the configuration before use
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.keyword.is_empty() {
            return Err(SchemaError::InvalidConfig {
                reason: "annotation keyword must not be empty".to_string(),
            });
        }
        if self.max_ref_depth == 0 || self.max_ref_depth > HARD_MAX_REF_DEPTH {
            return Err(SchemaError::InvalidConfig {
                reason: format!(
                    "max_ref_depth {} must be between 1 and {}",
                    self.max_ref_depth, HARD_MAX_REF_DEPTH
                ),
            });
        }
        Ok(())
    }
}
