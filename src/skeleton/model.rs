use crate::constants::{permissions, TEMPLATE_SUFFIX};
use crate::loader::SkeletonReference;
use crate::values::Values;
use std::path::{Path, PathBuf};

/// Whether an entry is planned as a directory or a regular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Directory,
    Regular,
}

/// Where the bytes of a file come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Absolute path inside a skeleton directory.
    Disk(PathBuf),
    /// Content produced in memory, such as a license text.
    Generated(String),
}

/// One entry of a skeleton, relative to the skeleton root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkeletonFile {
    pub path: PathBuf,
    pub source: FileSource,
    pub kind: FileKind,
    pub permissions: u32,
    /// Set when the entry comes from an ancestor rather than the leaf skeleton.
    pub inherited: bool,
}

impl SkeletonFile {
    /// A regular file with generated content.
    pub fn generated<P: Into<PathBuf>>(path: P, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: FileSource::Generated(content.into()),
            kind: FileKind::Regular,
            permissions: permissions::FILE,
            inherited: false,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }

    /// Regular files whose name carries the template suffix are rendered.
    pub fn is_template(&self) -> bool {
        self.kind == FileKind::Regular
            && self
                .path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(TEMPLATE_SUFFIX))
    }
}

/// A skeleton with its ancestor chain merged in.
#[derive(Debug, Clone)]
pub struct ResolvedSkeleton {
    pub(crate) description: String,
    pub(crate) values: Values,
    pub(crate) files: Vec<SkeletonFile>,
    pub(crate) reference: SkeletonReference,
    pub(crate) parent: Option<Box<ResolvedSkeleton>>,
}

impl ResolvedSkeleton {
    pub(crate) fn new(
        description: String,
        values: Values,
        mut files: Vec<SkeletonFile>,
        reference: SkeletonReference,
        parent: Option<Box<ResolvedSkeleton>>,
    ) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self { description, values, files, reference, parent }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    /// Merged entries ordered by relative path.
    pub fn files(&self) -> &[SkeletonFile] {
        &self.files
    }

    pub fn file<P: AsRef<Path>>(&self, path: P) -> Option<&SkeletonFile> {
        self.files.iter().find(|file| file.path == path.as_ref())
    }

    pub fn reference(&self) -> &SkeletonReference {
        &self.reference
    }

    pub fn parent(&self) -> Option<&ResolvedSkeleton> {
        self.parent.as_deref()
    }

    /// The parent chain, nearest ancestor first.
    pub fn ancestors(&self) -> impl Iterator<Item = &ResolvedSkeleton> {
        std::iter::successors(self.parent(), |skeleton| skeleton.parent())
    }
}
