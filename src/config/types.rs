//! Basic types for skeleton configuration

use serde::Deserialize;

/// Parent skeleton declared in a marker file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentReference {
    /// Name of the parent skeleton inside its repository.
    pub skeleton_name: String,
    /// Location of the parent's repository. Empty means the child's own repository.
    #[serde(default, rename = "repositoryURL")]
    pub repository_url: String,
}

impl ParentReference {
    /// Whether the parent lives in the same repository as the child.
    pub fn is_same_repository(&self) -> bool {
        self.repository_url.trim().is_empty()
    }
}
