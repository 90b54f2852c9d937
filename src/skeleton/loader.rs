use crate::config::{ParentReference, SkeletonConfig};
use crate::constants::MARKER_FILE;
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::loader::{
    open_source, LocalSource, Location, RepositoryReference, SkeletonReference, Source,
    SourceOptions,
};
use crate::skeleton::merge::inherit;
use crate::skeleton::model::{FileKind, FileSource, ResolvedSkeleton, SkeletonFile};
use log::{debug, warn};
use std::collections::HashSet;
use std::fs::Metadata;
use std::path::Path;
use walkdir::WalkDir;

/// Loads skeletons together with their parent chains.
#[derive(Debug, Clone, Default)]
pub struct SkeletonLoader {
    options: SourceOptions,
}

impl SkeletonLoader {
    /// `options` are used to open repositories named by parent references.
    pub fn new(options: SourceOptions) -> Self {
        Self { options }
    }

    /// Loads `reference` and merges every ancestor beneath it.
    ///
    /// # Errors
    /// * `Error::DependencyCycle` if a skeleton appears twice in its own chain
    pub fn load(&self, reference: &SkeletonReference) -> Result<ResolvedSkeleton> {
        self.load_chain(reference, &mut HashSet::new())
    }

    fn load_chain(
        &self,
        reference: &SkeletonReference,
        visited: &mut HashSet<(String, String)>,
    ) -> Result<ResolvedSkeleton> {
        let key = (reference.repository.identity(), reference.name.clone());
        if !visited.insert(key) {
            return Err(Error::DependencyCycle {
                name: reference.name.clone(),
                repository: reference.repository.to_string(),
            });
        }

        debug!("Loading skeleton '{}' from '{}'", reference.name, reference.path.display());
        let config = SkeletonConfig::load(&reference.path)?;
        let files = collect_files(&reference.path)?;
        let own =
            ResolvedSkeleton::new(config.description, config.values, files, reference.clone(), None);

        match &config.parent {
            None => Ok(own),
            Some(parent) => {
                let parent_reference = self.resolve_parent(reference, parent)?;
                let parent = self.load_chain(&parent_reference, visited)?;
                Ok(inherit(parent, own))
            }
        }
    }

    fn resolve_parent(
        &self,
        child: &SkeletonReference,
        parent: &ParentReference,
    ) -> Result<SkeletonReference> {
        if parent.is_same_repository() {
            let source = LocalSource::at(child.repository.clone(), child.repository_root.clone());
            return source.resolve(&parent.skeleton_name);
        }

        let repository = parent_repository(child, parent.repository_url.trim())?;
        debug!("Parent '{}' of '{}' lives in {repository}", parent.skeleton_name, child.name);
        open_source(repository, &self.options)?.resolve(&parent.skeleton_name)
    }
}

/// Relative local locations are anchored at the child's repository root.
fn parent_repository(child: &SkeletonReference, location: &str) -> Result<RepositoryReference> {
    let reference = RepositoryReference::parse(location)?;
    match reference.location() {
        Location::Local(path) if path.is_relative() => {
            Ok(RepositoryReference::local(child.repository_root.join(path).clean()))
        }
        _ => Ok(reference),
    }
}

/// Collects every entry below `root` except the marker file.
fn collect_files(root: &Path) -> Result<Vec<SkeletonFile>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| Error::ProcessError {
                source_path: entry.path().display().to_string(),
                e: e.to_string(),
            })?
            .to_path_buf();
        if relative == Path::new(MARKER_FILE) {
            continue;
        }

        let file_type = entry.file_type();
        let kind = if file_type.is_dir() {
            FileKind::Directory
        } else if file_type.is_file() {
            FileKind::Regular
        } else {
            warn!(
                "Skipping '{}': only directories and regular files are supported",
                entry.path().display()
            );
            continue;
        };

        let metadata = entry.metadata()?;
        files.push(SkeletonFile {
            path: relative,
            source: FileSource::Disk(entry.path().to_path_buf()),
            kind,
            permissions: mode(&metadata, kind),
            inherited: false,
        });
    }
    Ok(files)
}

#[cfg(unix)]
fn mode(metadata: &Metadata, _kind: FileKind) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode(_metadata: &Metadata, kind: FileKind) -> u32 {
    use crate::constants::permissions;
    match kind {
        FileKind::Directory => permissions::DIRECTORY,
        FileKind::Regular => permissions::FILE,
    }
}
