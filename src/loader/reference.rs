//! Locators for repositories and the skeletons inside them.

use crate::constants::{DEFAULT_REVISION, REVISION_QUERY_PARAM};
use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use url::{form_urlencoded, Url};

/// Where a repository lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Directory on the local filesystem.
    Local(PathBuf),
    /// Git remote, without the `revision` query parameter.
    Remote(Url),
}

/// Immutable reference to a repository of skeletons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReference {
    name: Option<String>,
    location: Location,
    revision: Option<String>,
}

impl RepositoryReference {
    /// Parses a repository location.
    ///
    /// A URL with a non-empty host is remote and may carry a `revision` query
    /// parameter. A host-less `file:` URL is decoded into the local path it
    /// names. Everything else is a local path.
    pub fn parse(location: &str) -> Result<Self> {
        let trimmed = location.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidRepository {
                location: location.to_string(),
                reason: "location is empty".to_string(),
            });
        }

        match Url::parse(trimmed) {
            Ok(url) if url.host_str().is_some_and(|host| !host.is_empty()) => {
                Ok(Self::from_url(url))
            }
            Ok(url) if url.scheme() == "file" => {
                let path = url.to_file_path().map_err(|_| Error::InvalidRepository {
                    location: location.to_string(),
                    reason: "file URL does not name a local path".to_string(),
                })?;
                Ok(Self::local(path))
            }
            _ => Ok(Self::local(trimmed)),
        }
    }

    /// Reference to a local directory.
    pub fn local<P: Into<PathBuf>>(path: P) -> Self {
        Self { name: None, location: Location::Local(path.into()), revision: None }
    }

    /// Reference to a git remote, including host-less URLs such as `file://`.
    ///
    /// An explicit `revision` wins over one carried in the URL's query.
    pub fn remote(url: Url, revision: Option<String>) -> Self {
        let mut reference = Self::from_url(url);
        if let Some(revision) = revision.filter(|revision| !revision.is_empty()) {
            reference.revision = Some(revision);
        }
        reference
    }

    fn from_url(mut url: Url) -> Self {
        let mut revision = None;
        let mut remaining = Vec::new();
        for (key, value) in url.query_pairs() {
            if key == REVISION_QUERY_PARAM {
                revision = Some(value.into_owned()).filter(|value| !value.is_empty());
            } else {
                remaining.push((key.into_owned(), value.into_owned()));
            }
        }

        if remaining.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(remaining);
        }

        Self { name: None, location: Location::Remote(url), revision }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub(crate) fn with_local_root(mut self, root: PathBuf) -> Self {
        self.location = Location::Local(root);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.location, Location::Remote(_))
    }

    /// Effective revision: the requested one, or the default branch for remotes.
    pub fn revision(&self) -> Option<&str> {
        match self.location {
            Location::Local(_) => None,
            Location::Remote(_) => Some(self.revision.as_deref().unwrap_or(DEFAULT_REVISION)),
        }
    }

    /// Stable key of the repository location and revision.
    pub fn identity(&self) -> String {
        match &self.location {
            Location::Local(path) => path.display().to_string(),
            Location::Remote(url) => {
                format!("{url}#{}", self.revision().unwrap_or(DEFAULT_REVISION))
            }
        }
    }

    /// Directory holding the git cache of a remote repository.
    ///
    /// Derived from host, URL path and escaped revision, so distinct
    /// revisions of one repository never share a directory. `None` for local
    /// repositories.
    pub fn cache_path(&self, cache_root: &Path) -> Option<PathBuf> {
        let Location::Remote(url) = &self.location else {
            return None;
        };

        let host = url.host_str().filter(|host| !host.is_empty()).unwrap_or("localhost");
        let host = match url.port() {
            Some(port) => format!("{host}_{port}"),
            None => host.to_string(),
        };

        let mut path = cache_root.join("repositories").join(host);
        for segment in url.path_segments().into_iter().flatten() {
            if !segment.is_empty() && segment != "." && segment != ".." {
                path.push(segment);
            }
        }
        path.push(escape_revision(self.revision().unwrap_or(DEFAULT_REVISION)));
        Some(path)
    }
}

fn escape_revision(revision: &str) -> String {
    let escaped: String = form_urlencoded::byte_serialize(revision.as_bytes()).collect();
    if escaped.chars().all(|c| c == '.') {
        escaped.replace('.', "%2E")
    } else {
        escaped
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            return write!(f, "repository '{name}'");
        }
        match &self.location {
            Location::Local(path) => write!(f, "local repository '{}'", path.display()),
            Location::Remote(url) => write!(
                f,
                "git repository '{url}' at '{}'",
                self.revision().unwrap_or(DEFAULT_REVISION)
            ),
        }
    }
}

/// Pure locator of one skeleton inside a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkeletonReference {
    /// Name relative to the repository's `skeletons/` directory, `/`-separated.
    pub name: String,
    /// Absolute directory of the skeleton.
    pub path: PathBuf,
    /// Local root of the owning repository (the cache directory for remotes).
    pub repository_root: PathBuf,
    pub repository: RepositoryReference,
}

impl SkeletonReference {
    /// `repository:name` when the repository is named, otherwise the bare name.
    pub fn qualified_name(&self) -> String {
        match self.repository.name() {
            Some(repository) => format!("{repository}:{}", self.name),
            None => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_with_host_are_remote() {
        let reference =
            RepositoryReference::parse("https://github.com/acme/skeletons.git").unwrap();
        assert!(reference.is_remote());
        assert_eq!(reference.revision(), Some(DEFAULT_REVISION));
    }

    #[test]
    fn paths_are_local() {
        for location in ["./skeletons", "/srv/skeletons", "relative", r"C:\skeletons"] {
            let reference = RepositoryReference::parse(location).unwrap();
            assert!(!reference.is_remote(), "{location} should be local");
            assert_eq!(reference.revision(), None);
        }
    }

    #[cfg(unix)]
    #[test]
    fn hostless_file_urls_are_decoded_paths() {
        let reference = RepositoryReference::parse("file:///srv/my%20skeletons").unwrap();
        assert_eq!(reference.location(), &Location::Local(PathBuf::from("/srv/my skeletons")));
    }

    #[test]
    fn empty_location_is_invalid() {
        assert!(matches!(
            RepositoryReference::parse("  "),
            Err(Error::InvalidRepository { .. })
        ));
    }

    #[test]
    fn revision_query_is_extracted() {
        let reference = RepositoryReference::parse(
            "https://github.com/acme/skeletons.git?revision=v1.2.0&depth=1",
        )
        .unwrap();
        assert_eq!(reference.revision(), Some("v1.2.0"));
        let Location::Remote(url) = reference.location() else {
            panic!("expected a remote location");
        };
        assert_eq!(url.as_str(), "https://github.com/acme/skeletons.git?depth=1");
    }

    #[test]
    fn cache_path_separates_revisions() {
        let root = Path::new("/cache");
        let main = RepositoryReference::parse("https://github.com/acme/skel.git").unwrap();
        let feature = RepositoryReference::parse(
            "https://github.com/acme/skel.git?revision=feature/login",
        )
        .unwrap();

        let main_path = main.cache_path(root).unwrap();
        let feature_path = feature.cache_path(root).unwrap();
        assert_eq!(
            main_path,
            Path::new("/cache/repositories/github.com/acme/skel.git/main")
        );
        assert_eq!(
            feature_path,
            Path::new("/cache/repositories/github.com/acme/skel.git/feature%2Flogin")
        );
        assert_ne!(main_path, feature_path);
    }

    #[test]
    fn cache_path_keeps_port_and_escapes_dot_revisions() {
        let reference =
            RepositoryReference::parse("http://localhost:3000/user/repo?revision=..").unwrap();
        assert_eq!(
            reference.cache_path(Path::new("/c")).unwrap(),
            Path::new("/c/repositories/localhost_3000/user/repo/%2E%2E")
        );
    }

    #[test]
    fn local_repositories_have_no_cache_path() {
        assert!(RepositoryReference::local("/srv").cache_path(Path::new("/c")).is_none());
    }

    #[test]
    fn identity_distinguishes_revisions() {
        let a = RepositoryReference::parse("https://h.example/r?revision=a").unwrap();
        let b = RepositoryReference::parse("https://h.example/r?revision=b").unwrap();
        assert_ne!(a.identity(), b.identity());
    }

    #[test]
    fn explicit_revision_wins() {
        let url = Url::parse("file:///tmp/origin?revision=old").unwrap();
        let reference = RepositoryReference::remote(url, Some("new".into()));
        assert_eq!(reference.revision(), Some("new"));
    }

    #[test]
    fn display_prefers_name() {
        let reference = RepositoryReference::local("/srv").with_name("team");
        assert_eq!(reference.to_string(), "repository 'team'");
    }
}
