//! Nested key-value maps exposed to templates, and their merge rule.

use serde_json::Value;
use std::path::Path;

use crate::error::{Error, Result};

/// Nested mapping of values. Key order carries no meaning.
pub type Values = serde_json::Map<String, Value>;

/// Merges `overlay` on top of `base`.
///
/// When both sides hold a mapping under the same key the mappings are merged
/// recursively. Any other combination lets the overlay replace the base value
/// wholesale, so a scalar in the overlay discards a nested mapping in the base.
pub fn merge_values(base: &Values, overlay: &Values) -> Values {
    let mut merged = base.clone();
    for (key, value) in overlay {
        match (merged.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                *existing = merge_values(existing, incoming);
            }
            _ => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    merged
}

/// Reads a YAML file holding a mapping of override values.
///
/// An empty file yields an empty mapping.
pub fn values_from_file<P: AsRef<Path>>(path: P) -> Result<Values> {
    let content = std::fs::read_to_string(path.as_ref())?;
    if content.trim().is_empty() {
        return Ok(Values::new());
    }
    Ok(serde_yaml::from_str(&content)?)
}

/// Parses a `KEY.PATH=VALUE` assignment into a nested mapping.
///
/// The value is read as a YAML scalar or flow collection, so `true`, `3` and
/// `[a, b]` become typed values. Anything that does not parse stays a string.
pub fn parse_assignment(assignment: &str) -> Result<Values> {
    let invalid = || Error::InvalidAssignment { assignment: assignment.to_string() };

    let (key, raw) = assignment.split_once('=').ok_or_else(invalid)?;
    let segments: Vec<&str> = key.trim().split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(invalid());
    }

    let mut value = if raw.is_empty() {
        Value::String(String::new())
    } else {
        serde_yaml::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
    };

    for segment in segments.iter().skip(1).rev() {
        let mut nested = Values::new();
        nested.insert(segment.to_string(), value);
        value = Value::Object(nested);
    }

    let mut values = Values::new();
    values.insert(segments[0].to_string(), value);
    Ok(values)
}

/// Folds value files and assignments into one override mapping.
///
/// Files are applied first in order, then assignments in order; later entries
/// win.
pub fn collect_overrides<P, S>(files: &[P], assignments: &[S]) -> Result<Values>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let mut overrides = Values::new();
    for file in files {
        overrides = merge_values(&overrides, &values_from_file(file)?);
    }
    for assignment in assignments {
        overrides = merge_values(&overrides, &parse_assignment(assignment.as_ref())?);
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(value: Value) -> Values {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn merge_recurses_into_nested_maps() {
        let base = values(json!({"db": {"host": "localhost", "port": 5432}, "name": "a"}));
        let overlay = values(json!({"db": {"port": 6543}, "extra": true}));

        let merged = merge_values(&base, &overlay);
        assert_eq!(
            Value::Object(merged),
            json!({"db": {"host": "localhost", "port": 6543}, "name": "a", "extra": true})
        );
    }

    #[test]
    fn scalar_override_discards_nested_map() {
        let base = values(json!({"features": {"auth": true, "metrics": true}}));
        let overlay = values(json!({"features": false}));

        let merged = merge_values(&base, &overlay);
        assert_eq!(Value::Object(merged), json!({"features": false}));
    }

    #[test]
    fn map_override_replaces_scalar() {
        let base = values(json!({"features": "none"}));
        let overlay = values(json!({"features": {"auth": true}}));

        let merged = merge_values(&base, &overlay);
        assert_eq!(Value::Object(merged), json!({"features": {"auth": true}}));
    }

    #[test]
    fn assignment_builds_nested_typed_values() {
        let parsed = parse_assignment("db.port=6543").unwrap();
        assert_eq!(Value::Object(parsed), json!({"db": {"port": 6543}}));

        let parsed = parse_assignment("flags=[a, b]").unwrap();
        assert_eq!(Value::Object(parsed), json!({"flags": ["a", "b"]}));

        let parsed = parse_assignment("enabled=true").unwrap();
        assert_eq!(Value::Object(parsed), json!({"enabled": true}));

        let parsed = parse_assignment("greeting=hello: world: again").unwrap();
        assert_eq!(Value::Object(parsed), json!({"greeting": "hello: world: again"}));

        let parsed = parse_assignment("empty=").unwrap();
        assert_eq!(Value::Object(parsed), json!({"empty": ""}));
    }

    #[test]
    fn assignment_without_key_is_rejected() {
        assert!(matches!(
            parse_assignment("novalue"),
            Err(Error::InvalidAssignment { .. })
        ));
        assert!(matches!(parse_assignment("a..b=1"), Err(Error::InvalidAssignment { .. })));
        assert!(matches!(parse_assignment("=1"), Err(Error::InvalidAssignment { .. })));
    }

    #[test]
    fn later_overrides_win() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("values.yaml");
        std::fs::write(&file, "db:\n  host: file-host\n  port: 1\n").unwrap();

        let overrides = collect_overrides(&[&file], &["db.port=2"]).unwrap();
        assert_eq!(Value::Object(overrides), json!({"db": {"host": "file-host", "port": 2}}));
    }

    #[test]
    fn empty_values_file_is_empty_map() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("values.yaml");
        std::fs::write(&file, "\n").unwrap();
        assert!(values_from_file(&file).unwrap().is_empty());
    }
}
