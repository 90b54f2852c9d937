use crate::constants::{MARKER_FILE, SKELETONS_DIR};
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::loader::interface::Source;
use crate::loader::reference::{Location, RepositoryReference, SkeletonReference};
use log::debug;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Repository of skeletons in a local directory.
///
/// A skeleton is any directory below `<root>/skeletons/` that contains the
/// marker file.
#[derive(Debug, Clone)]
pub struct LocalSource {
    reference: RepositoryReference,
    root: PathBuf,
}

impl LocalSource {
    /// Creates a LocalSource for a local reference.
    ///
    /// The root is made absolute and normalized, the directory does not have
    /// to exist yet.
    pub fn new(reference: RepositoryReference) -> Result<Self> {
        let Location::Local(path) = reference.location() else {
            return Err(Error::InvalidRepository {
                location: reference.to_string(),
                reason: "not a local path".to_string(),
            });
        };
        let root = std::path::absolute(path)?.clean();
        Ok(Self::at(reference.with_local_root(root.clone()), root))
    }

    /// Creates a LocalSource reading from `root` but reporting `reference`.
    pub(crate) fn at(reference: RepositoryReference, root: PathBuf) -> Self {
        Self { reference, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn reference(&self) -> &RepositoryReference {
        &self.reference
    }

    fn skeletons_dir(&self) -> PathBuf {
        self.root.join(SKELETONS_DIR)
    }

    fn skeleton(&self, name: String, path: PathBuf) -> SkeletonReference {
        SkeletonReference {
            name,
            path,
            repository_root: self.root.clone(),
            repository: self.reference.clone(),
        }
    }

    fn not_found(&self, name: &str) -> Error {
        Error::SkeletonNotFound { name: name.to_string(), repository: self.reference.to_string() }
    }
}

/// Names are relative paths made of plain components only.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name).components().all(|component| matches!(component, Component::Normal(_)))
}

impl Source for LocalSource {
    fn resolve(&self, name: &str) -> Result<SkeletonReference> {
        if !is_valid_name(name) {
            return Err(self.not_found(name));
        }

        let path = self.skeletons_dir().join(name);
        if path.join(MARKER_FILE).is_file() {
            debug!("Resolved skeleton '{name}' to '{}'", path.display());
            Ok(self.skeleton(name.to_string(), path))
        } else {
            Err(self.not_found(name))
        }
    }

    fn list(&self) -> Result<Vec<SkeletonReference>> {
        let dir = self.skeletons_dir();
        if !dir.is_dir() {
            debug!("'{}' has no skeletons directory", self.root.display());
            return Ok(Vec::new());
        }

        let mut skeletons = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_dir() || !entry.path().join(MARKER_FILE).is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&dir).map_err(|e| Error::ProcessError {
                source_path: entry.path().display().to_string(),
                e: e.to_string(),
            })?;
            skeletons.push(self.skeleton(relative.to_slash_string(), entry.path().to_path_buf()));
        }
        skeletons.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(skeletons)
    }
}
