//! Repositories of skeletons and how names are resolved against them.

use crate::cancel::CancelToken;
use crate::constants::CACHE_DIR_NAME;
use crate::error::Result;
use std::path::PathBuf;

pub mod git;
pub mod interface;
pub mod local;
pub mod reference;
pub mod remote;
pub mod resolver;

pub use interface::Source;
pub use local::LocalSource;
pub use reference::{Location, RepositoryReference, SkeletonReference};
pub use remote::RemoteSource;
pub use resolver::{resolve_repository, Resolver};

/// Settings shared by every source opened for one invocation.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Root of the git cache; remote checkouts live below `repositories/`.
    pub cache_root: PathBuf,
    /// Aborts network operations of remote sources.
    pub cancel: CancelToken,
}

impl SourceOptions {
    pub fn new<P: Into<PathBuf>>(cache_root: P) -> Self {
        Self { cache_root: cache_root.into(), cancel: CancelToken::new() }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self::new(default_cache_root())
    }
}

/// Platform cache directory for skelly, falling back to the temp directory.
pub fn default_cache_root() -> PathBuf {
    dirs::cache_dir().unwrap_or_else(std::env::temp_dir).join(CACHE_DIR_NAME)
}

/// Opens the source matching the kind of `reference`.
pub fn open_source(
    reference: RepositoryReference,
    options: &SourceOptions,
) -> Result<Box<dyn Source>> {
    if reference.is_remote() {
        Ok(Box::new(RemoteSource::new(reference, options)?))
    } else {
        Ok(Box::new(LocalSource::new(reference)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cache_root_is_namespaced() {
        assert!(default_cache_root().ends_with(CACHE_DIR_NAME));
    }

    #[test]
    fn opens_by_location_kind() {
        let options = SourceOptions::new("/tmp/skelly-cache");
        let local = RepositoryReference::parse("./somewhere").unwrap();
        assert!(open_source(local, &options).is_ok());

        let remote = RepositoryReference::parse("https://example.com/a/b.git").unwrap();
        assert!(open_source(remote, &options).is_ok());
    }
}
