use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Extension trait for Path to provide string conversion and lexical helpers
pub trait PathExt {
    /// Converts a path to a string slice, returning an error if the path contains invalid Unicode characters.
    ///
    /// # Examples
    /// ```
    /// use skelly::ext::PathExt;
    /// use std::path::Path;
    ///
    /// let path = Path::new("test");
    /// assert_eq!(path.to_str_checked().unwrap(), "test");
    /// ```
    fn to_str_checked(&self) -> Result<&str>;

    /// Lexically normalizes the path without touching the filesystem.
    ///
    /// `.` components are dropped and `..` removes the preceding normal
    /// component. Leading `..` components of a relative path are kept, and
    /// `..` directly below the root is dropped. An empty result stays empty.
    ///
    /// # Examples
    /// ```
    /// use skelly::ext::PathExt;
    /// use std::path::{Path, PathBuf};
    ///
    /// assert_eq!(Path::new("a/./b/../c").clean(), PathBuf::from("a/c"));
    /// assert_eq!(Path::new("a/../../x").clean(), PathBuf::from("../x"));
    /// ```
    fn clean(&self) -> PathBuf;

    /// Joins the components with `/`, regardless of the platform separator.
    fn to_slash_string(&self) -> String;
}

impl PathExt for Path {
    fn to_str_checked(&self) -> Result<&str> {
        self.to_str().ok_or_else(|| Error::InvalidUnicodePath(self.display().to_string()))
    }

    fn clean(&self) -> PathBuf {
        let mut kept: Vec<Component> = Vec::new();
        for component in self.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => match kept.last() {
                    Some(Component::Normal(_)) => {
                        kept.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => kept.push(component),
                },
                other => kept.push(other),
            }
        }
        kept.iter().collect()
    }

    fn to_slash_string(&self) -> String {
        self.components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_str_checked_valid() {
        let path = Path::new("valid_path");
        assert_eq!(path.to_str_checked().unwrap(), "valid_path");
    }

    #[test]
    fn clean_collapses_parent_components() {
        assert_eq!(Path::new("a/b/../c").clean(), PathBuf::from("a/c"));
        assert_eq!(Path::new("./a/./b").clean(), PathBuf::from("a/b"));
        assert_eq!(Path::new("a/..").clean(), PathBuf::new());
        assert_eq!(Path::new("../../escape").clean(), PathBuf::from("../../escape"));
    }

    #[cfg(unix)]
    #[test]
    fn clean_never_climbs_above_root() {
        assert_eq!(Path::new("/../etc").clean(), PathBuf::from("/etc"));
        assert_eq!(Path::new("/srv/repo/../other").clean(), PathBuf::from("/srv/other"));
    }

    #[test]
    fn slash_string_joins_components() {
        let path: PathBuf = ["nested", "go", "cli"].iter().collect();
        assert_eq!(path.to_slash_string(), "nested/go/cli");
    }
}
