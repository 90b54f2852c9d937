use crate::error::Result;
use crate::loader::reference::SkeletonReference;

/// A repository of skeletons, or a set of them.
pub trait Source: Send + Sync {
    /// Finds the skeleton called `name`.
    ///
    /// # Returns
    /// * `Result<SkeletonReference>` - Locator of the skeleton, or
    ///   `Error::SkeletonNotFound` when the source does not contain it
    fn resolve(&self, name: &str) -> Result<SkeletonReference>;

    /// Lists every skeleton of the source, ordered by name.
    fn list(&self) -> Result<Vec<SkeletonReference>>;
}
