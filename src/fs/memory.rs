use crate::constants::permissions;
use crate::error::Result;
use crate::ext::PathExt;
use crate::fs::{EntryKind, FileStat, FileSystem};
use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryEntry {
    Directory { permissions: u32 },
    File { content: Vec<u8>, permissions: u32 },
}

/// Filesystem kept in memory, keyed by lexically cleaned path.
///
/// Follows the OS rules that matter to plans: files need an existing parent
/// directory and files and directories cannot replace each other.
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    entries: BTreeMap<PathBuf, MemoryEntry>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry<P: AsRef<Path>>(&self, path: P) -> Option<&MemoryEntry> {
        self.entries.get(&path.as_ref().clean())
    }

    /// Content of the file at `path`.
    pub fn read<P: AsRef<Path>>(&self, path: P) -> Option<&[u8]> {
        match self.entry(path)? {
            MemoryEntry::File { content, .. } => Some(content),
            MemoryEntry::Directory { .. } => None,
        }
    }

    pub fn read_to_string<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        self.read(path).and_then(|content| String::from_utf8(content.to_vec()).ok())
    }

    pub fn permissions<P: AsRef<Path>>(&self, path: P) -> Option<u32> {
        match self.entry(path)? {
            MemoryEntry::File { permissions, .. } | MemoryEntry::Directory { permissions } => {
                Some(*permissions)
            }
        }
    }

    /// Every path, ordered.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Roots and the empty path always exist.
fn is_root(path: &Path) -> bool {
    path.parent().is_none()
}

fn not_a_directory(path: &Path) -> io::Error {
    io::Error::other(format!("'{}' is not a directory", path.display()))
}

impl FileSystem for MemoryFileSystem {
    fn stat(&self, path: &Path) -> Result<Option<FileStat>> {
        let path = path.clean();
        if is_root(&path) {
            return Ok(Some(FileStat {
                kind: EntryKind::Directory,
                permissions: permissions::DIRECTORY,
            }));
        }
        Ok(self.entries.get(&path).map(|entry| match entry {
            MemoryEntry::Directory { permissions } => {
                FileStat { kind: EntryKind::Directory, permissions: *permissions }
            }
            MemoryEntry::File { permissions, .. } => {
                FileStat { kind: EntryKind::File, permissions: *permissions }
            }
        }))
    }

    fn create_dir_all(&mut self, path: &Path, permissions: u32) -> Result<()> {
        let mut current = PathBuf::new();
        for component in path.clean().components() {
            current.push(component);
            if matches!(component, Component::RootDir | Component::Prefix(_)) {
                continue;
            }
            match self.entries.get(&current) {
                Some(MemoryEntry::Directory { .. }) => {}
                Some(MemoryEntry::File { .. }) => return Err(not_a_directory(&current).into()),
                None => {
                    self.entries.insert(current.clone(), MemoryEntry::Directory { permissions });
                }
            }
        }
        Ok(())
    }

    fn write_file(&mut self, path: &Path, content: &[u8]) -> Result<()> {
        let path = path.clean();
        if let Some(parent) = path.parent().filter(|parent| !is_root(parent)) {
            match self.entries.get(parent) {
                Some(MemoryEntry::Directory { .. }) => {}
                Some(MemoryEntry::File { .. }) => return Err(not_a_directory(parent).into()),
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("parent directory of '{}' does not exist", path.display()),
                    )
                    .into())
                }
            }
        }

        let permissions = match self.entries.get(&path) {
            Some(MemoryEntry::Directory { .. }) => {
                return Err(io::Error::other(format!("'{}' is a directory", path.display())).into())
            }
            Some(MemoryEntry::File { permissions, .. }) => *permissions,
            None => permissions::FILE,
        };
        self.entries.insert(path, MemoryEntry::File { content: content.to_vec(), permissions });
        Ok(())
    }

    fn set_permissions(&mut self, path: &Path, mode: u32) -> Result<()> {
        match self.entries.get_mut(&path.clean()) {
            Some(MemoryEntry::Directory { permissions })
            | Some(MemoryEntry::File { permissions, .. }) => {
                *permissions = mode;
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("'{}' does not exist", path.display()),
            )
            .into()),
        }
    }
}
