use log::warn;
use minijinja::{Error, ErrorKind, Value};
use regex::Regex;

// Re-export all the case conversion and string manipulation functions
pub use cruet::{
    case::{
        camel::to_camel_case, kebab::to_kebab_case, pascal::to_pascal_case,
        screaming_snake::to_screaming_snake_case, snake::to_snake_case,
        table::to_table_case, train::to_train_case,
    },
    string::{pluralize::to_plural, singularize::to_singular},
    suffix::foreign_key::to_foreign_key,
};

/// Derives a safe identifier from a path-like string.
///
/// Takes the last non-empty path segment, drops every character that is not
/// alphanumeric and lower-cases the rest, so `github.com/acme/My-Widget`
/// becomes `mywidget`.
pub fn identifier(val: &str) -> String {
    let segment = val
        .rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .unwrap_or_default();

    segment
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Serializes any template value to YAML text, without the trailing newline.
pub fn to_yaml(val: Value) -> Result<String, Error> {
    let rendered = serde_yaml::to_string(&val).map_err(|e| {
        Error::new(ErrorKind::InvalidOperation, "cannot serialize value to YAML")
            .with_source(e)
    })?;
    Ok(rendered.trim_end_matches('\n').to_string())
}

/// Tests if a string matches a given regular expression pattern.
///
/// An invalid pattern logs a warning and never matches.
pub fn regex_filter(val: &str, re: &str) -> bool {
    match Regex::new(re) {
        Ok(re) => re.is_match(val),
        Err(err) => {
            warn!("Invalid regex '{re}': {err}");
            false
        }
    }
}
