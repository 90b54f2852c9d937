//! Filesystem capability used to build and apply plans.
//!
//! The same plan applies to the real filesystem or to memory, so previews run
//! exactly the code a real run does.

use crate::error::Result;
use std::path::Path;

pub mod memory;
pub mod os;

pub use memory::{MemoryEntry, MemoryFileSystem};
pub use os::OsFileSystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// What `stat` reports about an existing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub kind: EntryKind,
    pub permissions: u32,
}

pub trait FileSystem {
    /// `None` when nothing exists at `path`.
    fn stat(&self, path: &Path) -> Result<Option<FileStat>>;

    /// Creates `path` and missing ancestors. New directories get `permissions`.
    fn create_dir_all(&mut self, path: &Path, permissions: u32) -> Result<()>;

    /// Writes a file whose parent directory must already exist.
    fn write_file(&mut self, path: &Path, content: &[u8]) -> Result<()>;

    fn set_permissions(&mut self, path: &Path, permissions: u32) -> Result<()>;

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.stat(path)?.is_some())
    }
}
