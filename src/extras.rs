//! Generated extra files: license and gitignore texts.

use crate::constants::generated::{GITIGNORE_FILE, LICENSE_FILE};
use crate::error::{Error, Result};
use crate::plan::ProjectInfo;
use crate::skeleton::SkeletonFile;
use indexmap::IndexMap;
use std::path::{Component, Path, PathBuf};

/// Source of texts addressed by key, such as license identifiers.
pub trait TextProvider {
    /// # Errors
    /// * `Error::TextNotFound` when no text exists for `key`
    fn get(&self, key: &str) -> Result<String>;
}

/// Texts held in memory.
#[derive(Debug, Default, Clone)]
pub struct StaticTextProvider {
    texts: IndexMap<String, String>,
}

impl StaticTextProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.texts.insert(key.into(), text.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticTextProvider {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { texts: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

impl TextProvider for StaticTextProvider {
    fn get(&self, key: &str) -> Result<String> {
        self.texts.get(key).cloned().ok_or_else(|| Error::TextNotFound { key: key.to_string() })
    }
}

/// Texts stored as `<root>/<key><extension>` files.
#[derive(Debug, Clone)]
pub struct DirectoryTextProvider {
    root: PathBuf,
    extension: String,
}

impl DirectoryTextProvider {
    pub fn new<P: Into<PathBuf>>(root: P, extension: impl Into<String>) -> Self {
        Self { root: root.into(), extension: extension.into() }
    }
}

impl TextProvider for DirectoryTextProvider {
    fn get(&self, key: &str) -> Result<String> {
        let not_found = || Error::TextNotFound { key: key.to_string() };
        let mut components = Path::new(key).components();
        if !matches!((components.next(), components.next()), (Some(Component::Normal(_)), None)) {
            return Err(not_found());
        }

        let path = self.root.join(format!("{key}{}", self.extension));
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Placeholders of common license texts and what they stand for.
fn license_placeholders(project: &ProjectInfo) -> [(&'static str, String); 6] {
    let year = project.year.to_string();
    [
        ("[year]", year.clone()),
        ("[yyyy]", year),
        ("[fullname]", project.owner.clone()),
        ("[owner]", project.owner.clone()),
        ("[name of copyright owner]", project.owner.clone()),
        ("[project]", project.name.clone()),
    ]
}

/// The `LICENSE` entry for license `key` with placeholders filled in.
pub fn license_file(
    provider: &dyn TextProvider,
    key: &str,
    project: &ProjectInfo,
) -> Result<SkeletonFile> {
    let text = license_placeholders(project)
        .iter()
        .fold(provider.get(key)?, |text, (placeholder, value)| text.replace(placeholder, value));
    Ok(SkeletonFile::generated(LICENSE_FILE, text))
}

/// The `.gitignore` entry concatenating the texts for `keys`.
pub fn gitignore_file<S: AsRef<str>>(
    provider: &dyn TextProvider,
    keys: &[S],
) -> Result<SkeletonFile> {
    let mut sections = Vec::with_capacity(keys.len());
    for key in keys {
        let text = provider.get(key.as_ref())?;
        sections.push(text.trim_end().to_string());
    }
    let mut content = sections.join("\n\n");
    content.push('\n');
    Ok(SkeletonFile::generated(GITIGNORE_FILE, content))
}
