use crate::error::Result;
use crate::fs::{EntryKind, FileStat, FileSystem};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl OsFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for OsFileSystem {
    fn stat(&self, path: &Path) -> Result<Option<FileStat>> {
        match fs::metadata(path) {
            Ok(metadata) => {
                let kind =
                    if metadata.is_dir() { EntryKind::Directory } else { EntryKind::File };
                Ok(Some(FileStat { kind, permissions: mode(&metadata) }))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn create_dir_all(&mut self, path: &Path, permissions: u32) -> Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(permissions);
        }
        #[cfg(not(unix))]
        let _ = permissions;
        builder.create(path)?;
        Ok(())
    }

    fn write_file(&mut self, path: &Path, content: &[u8]) -> Result<()> {
        fs::write(path, content)?;
        Ok(())
    }

    #[cfg(unix)]
    fn set_permissions(&mut self, path: &Path, permissions: u32) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(permissions))?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn set_permissions(&mut self, _path: &Path, _permissions: u32) -> Result<()> {
        Ok(())
    }
}

#[cfg(unix)]
fn mode(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode(metadata: &fs::Metadata) -> u32 {
    use crate::constants::permissions;
    if metadata.is_dir() {
        permissions::DIRECTORY
    } else {
        permissions::FILE
    }
}
