//! Optional TOML configuration for the CLI
//!
//! ```toml
//! [extractor]
//! keyword = "repository"
//! formats = ["file"]
//! max_ref_depth = 64
//!
//! [limits]
//! max_depth = 32
//! max_pointer_length = 1024
//! ```

use dor_pointer::PointerLimits;
use dor_schema::ExtractorConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures loading configuration or input files
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("No value at pointer '{pointer}'")]
    Missing { pointer: String },

    #[error("Document has {count} validation issue(s)")]
    Invalid { count: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub extractor: ExtractorConfig,
    pub limits: PointerLimits,
}

impl CliConfig {
    /// Load `path`, or defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: CliConfig = toml::from_str("[extractor]\nformats = [\"file\"]\n").unwrap();
        assert_eq!(config.extractor.keyword, "repository");
        assert_eq!(config.extractor.formats, vec!["file".to_string()]);
        assert_eq!(config.limits, PointerLimits::default());
    }

    #[test]
    fn limits_section_is_read() {
        let config: CliConfig = toml::from_str("[limits]\nmax_depth = 4\n").unwrap();
        assert_eq!(config.limits.max_depth, 4);
        assert_eq!(config.limits.max_pointer_length, 1024);
    }
}
