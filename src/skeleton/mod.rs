//! Loading, inheritance and composition of skeletons.

pub mod loader;
pub mod merge;
pub mod model;

pub use loader::SkeletonLoader;
pub use merge::{compose_skeletons, merge_files, overlay};
pub use model::{FileKind, FileSource, ResolvedSkeleton, SkeletonFile};
