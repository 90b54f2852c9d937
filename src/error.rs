use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    #[error("Failed to walk directory. Original error: {0}")]
    WalkDirError(#[from] walkdir::Error),

    #[error("Failed to parse YAML. Original error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Git operation failed. Original error: {0}")]
    Git2Error(#[from] git2::Error),

    /// Undefined value or syntax error; the message names the template and line.
    #[error("Failed to render. Original error: {0:#}")]
    TemplateError(#[from] minijinja::Error),

    #[error("Invalid repository location '{location}': {reason}.")]
    InvalidRepository { location: String, reason: String },

    #[error("Repository '{name}' is not configured.")]
    RepositoryNotFound { name: String },

    #[error("Skeleton '{name}' was not found in {repository}.")]
    SkeletonNotFound { name: String, repository: String },

    #[error(
        "Skeleton '{name}' is ambiguous, it exists in repositories: {}. Use REPOSITORY:SKELETON.",
        repositories.join(", ")
    )]
    AmbiguousSkeleton { name: String, repositories: Vec<String> },

    #[error("Dependency cycle detected: skeleton '{name}' from {repository} is its own ancestor.")]
    DependencyCycle { name: String, repository: String },

    #[error("Rendered name '{rendered}' of '{path}' escapes its parent directory.")]
    PathInjection { path: String, rendered: String },

    #[error("Name of '{path}' rendered to an empty string.")]
    EmptyRenderResult { path: String },

    /// Only surfaced when no cached copy exists to fall back to.
    #[error("Temporary network error while synchronizing '{url}': {message}")]
    NetworkTransient { url: String, message: String },

    #[error("Revision '{revision}' was not found in '{url}'.")]
    RevisionNotFound { url: String, revision: String },

    #[error("Synchronization of '{url}' was cancelled.")]
    Cancelled { url: String },

    #[error("Failed to synchronize '{url}': {message}")]
    SyncFailed { url: String, message: String },

    #[error("At least one skeleton is required.")]
    NoSkeletons,

    #[error("'{key}' was not found.")]
    TextNotFound { key: String },

    #[error("Invalid value assignment '{assignment}', expected KEY=VALUE.")]
    InvalidAssignment { assignment: String },

    #[error("Path '{0}' contains invalid Unicode characters.")]
    InvalidUnicodePath(String),

    #[error("Cannot process the source path: '{source_path}'. Original error: {e}")]
    ProcessError { source_path: String, e: String },
}

impl Error {
    /// Whether the error means something was absent rather than broken.
    ///
    /// Callers may react to these by listing alternatives.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::SkeletonNotFound { .. }
                | Error::RepositoryNotFound { .. }
                | Error::RevisionNotFound { .. }
                | Error::TextNotFound { .. }
        )
    }
}

/// Convenience type alias for Results with skelly's Error as the error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(crate::constants::exit_codes::FAILURE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_family() {
        let missing =
            Error::SkeletonNotFound { name: "go".into(), repository: "local".into() };
        assert!(missing.is_not_found());
        assert!(Error::RepositoryNotFound { name: "x".into() }.is_not_found());
        assert!(!Error::NoSkeletons.is_not_found());
        assert!(!Error::DependencyCycle { name: "a".into(), repository: "r".into() }
            .is_not_found());
    }

    #[test]
    fn ambiguous_message_lists_repositories() {
        let err = Error::AmbiguousSkeleton {
            name: "go".into(),
            repositories: vec!["alpha".into(), "beta".into()],
        };
        let message = err.to_string();
        assert!(message.contains("alpha, beta"));
        assert!(message.contains("'go'"));
    }
}
