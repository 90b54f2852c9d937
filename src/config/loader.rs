//! Marker file loading

use crate::config::types::ParentReference;
use crate::constants::MARKER_FILE;
use crate::error::{Error, Result};
use crate::values::Values;
use serde::Deserialize;
use std::path::Path;

/// Contents of a skeleton's marker file.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SkeletonConfig {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent: Option<ParentReference>,
    #[serde(default)]
    pub values: Values,
}

impl SkeletonConfig {
    /// Loads the marker file of the skeleton rooted at `skeleton_root`.
    pub fn load<P: AsRef<Path>>(skeleton_root: P) -> Result<Self> {
        let config_path = skeleton_root.as_ref().join(MARKER_FILE);
        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            Error::ProcessError {
                source_path: config_path.display().to_string(),
                e: e.to_string(),
            }
        })?;
        Self::parse(&content)
    }

    /// Parses marker file content. An empty document is an empty configuration.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_marker_file() {
        let config = SkeletonConfig::parse(
            r#"
description: Go command line tool
parent:
  skeletonName: go/base
values:
  module: github.com/acme/tool
  lint:
    enabled: true
"#,
        )
        .unwrap();

        assert_eq!(config.description, "Go command line tool");
        assert_eq!(config.parent.unwrap().skeleton_name, "go/base");
        assert_eq!(
            serde_json::Value::Object(config.values),
            json!({"module": "github.com/acme/tool", "lint": {"enabled": true}})
        );
    }

    #[test]
    fn empty_marker_file_is_default() {
        let config = SkeletonConfig::parse("  \n").unwrap();
        assert!(config.description.is_empty());
        assert!(config.parent.is_none());
        assert!(config.values.is_empty());
    }

    #[test]
    fn malformed_marker_file_is_an_error() {
        let err = SkeletonConfig::parse("values: [unterminated").unwrap_err();
        assert!(matches!(err, Error::YamlError(_)));
    }

    #[test]
    fn missing_marker_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = SkeletonConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ProcessError { .. }));
    }
}
