use crate::error::{Error, Result};
use crate::loader::interface::Source;
use crate::loader::reference::{RepositoryReference, SkeletonReference};
use crate::loader::{open_source, SourceOptions};
use log::debug;
use std::collections::BTreeMap;

/// Named repositories queried together.
///
/// A qualified `repository:skeleton` name selects one repository, a bare name
/// must match in exactly one of them.
#[derive(Default)]
pub struct Resolver {
    sources: BTreeMap<String, Box<dyn Source>>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a source for every `(name, location)` pair.
    pub fn from_locations<I, N, L>(repositories: I, options: &SourceOptions) -> Result<Self>
    where
        I: IntoIterator<Item = (N, L)>,
        N: Into<String>,
        L: AsRef<str>,
    {
        let mut resolver = Self::new();
        for (name, location) in repositories {
            let name = name.into();
            let reference = RepositoryReference::parse(location.as_ref())?.with_name(name.clone());
            debug!("Registering {reference} at '{}'", location.as_ref());
            resolver.insert(name, open_source(reference, options)?);
        }
        Ok(resolver)
    }

    /// Registers `source` under `name`, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, source: Box<dyn Source>) -> &mut Self {
        self.sources.insert(name.into(), source);
        self
    }
}

impl Source for Resolver {
    fn resolve(&self, name: &str) -> Result<SkeletonReference> {
        if let Some((repository, skeleton)) = name.split_once(':') {
            if !repository.is_empty() && !skeleton.is_empty() {
                let source = self
                    .sources
                    .get(repository)
                    .ok_or_else(|| Error::RepositoryNotFound { name: repository.to_string() })?;
                return source.resolve(skeleton);
            }
        }

        let mut hits = Vec::new();
        for (repository, source) in &self.sources {
            match source.resolve(name) {
                Ok(found) => hits.push((repository.clone(), found)),
                Err(Error::SkeletonNotFound { .. }) => {}
                Err(err) => return Err(err),
            }
        }

        match hits.len() {
            0 => Err(Error::SkeletonNotFound {
                name: name.to_string(),
                repository: "any configured repository".to_string(),
            }),
            1 => Ok(hits.remove(0).1),
            _ => Err(Error::AmbiguousSkeleton {
                name: name.to_string(),
                repositories: hits.into_iter().map(|(repository, _)| repository).collect(),
            }),
        }
    }

    fn list(&self) -> Result<Vec<SkeletonReference>> {
        let mut skeletons = Vec::new();
        for source in self.sources.values() {
            skeletons.extend(source.list()?);
        }
        Ok(skeletons)
    }
}

/// Builds a resolver over named repository locations.
pub fn resolve_repository<I, N, L>(repositories: I, options: &SourceOptions) -> Result<Resolver>
where
    I: IntoIterator<Item = (N, L)>,
    N: Into<String>,
    L: AsRef<str>,
{
    Resolver::from_locations(repositories, options)
}
