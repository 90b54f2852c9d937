/// Handles argument parsing and command dispatch.
pub mod cli;

/// Cancellation of git network operations.
pub mod cancel;

/// Marker file parsing.
pub mod config;

/// Constants shared across modules.
pub mod constants;

/// Defines custom error types.
pub mod error;

/// Extension traits for standard types.
pub mod ext;

/// License and gitignore files generated alongside a skeleton.
pub mod extras;

/// Real and in-memory filesystems that plans are applied to.
pub mod fs;

/// Repositories of skeletons, local and remote, and name resolution.
pub mod loader;

/// Planning and applying filesystem operations.
pub mod plan;

/// Template parsing and rendering functionality.
pub mod renderer;

/// Loading, inheritance and composition of skeletons.
pub mod skeleton;

/// Nested values and their merge rule.
pub mod values;
