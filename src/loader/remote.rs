use crate::cancel::CancelToken;
use crate::constants::DEFAULT_REVISION;
use crate::error::{Error, Result};
use crate::loader::git::synchronize_once;
use crate::loader::interface::Source;
use crate::loader::local::LocalSource;
use crate::loader::reference::{Location, RepositoryReference, SkeletonReference};
use crate::loader::SourceOptions;
use std::path::Path;
use url::Url;

/// Repository of skeletons in a git remote.
///
/// Reads go to a local cache that is synchronized on first use. Skeleton
/// references keep the remote reference so parents declared without a
/// repository stay in the same remote.
pub struct RemoteSource {
    url: Url,
    revision: String,
    cancel: CancelToken,
    cache: LocalSource,
}

impl RemoteSource {
    pub fn new(reference: RepositoryReference, options: &SourceOptions) -> Result<Self> {
        let Location::Remote(url) = reference.location() else {
            return Err(Error::InvalidRepository {
                location: reference.to_string(),
                reason: "not a git remote".to_string(),
            });
        };
        let url = url.clone();
        let revision = reference.revision().unwrap_or(DEFAULT_REVISION).to_string();
        let cache_path = reference.cache_path(&options.cache_root).ok_or_else(|| {
            Error::InvalidRepository {
                location: url.to_string(),
                reason: "no cache directory can be derived".to_string(),
            }
        })?;

        Ok(Self {
            url,
            revision,
            cancel: options.cancel.clone(),
            cache: LocalSource::at(reference, cache_path),
        })
    }

    /// Directory of the cached checkout.
    pub fn cache_path(&self) -> &Path {
        self.cache.root()
    }

    pub fn reference(&self) -> &RepositoryReference {
        self.cache.reference()
    }

    fn synchronize(&self) -> Result<()> {
        synchronize_once(&self.url, &self.revision, self.cache.root(), &self.cancel)
    }
}

impl Source for RemoteSource {
    fn resolve(&self, name: &str) -> Result<SkeletonReference> {
        self.synchronize()?;
        self.cache.resolve(name)
    }

    fn list(&self) -> Result<Vec<SkeletonReference>> {
        self.synchronize()?;
        self.cache.list()
    }
}
