//! Skeleton configuration handling
//!
//! This module contains the marker file components:
//! - `types`: Parent reference declared by a skeleton
//! - `loader`: Marker file loading and parsing

pub mod loader;
pub mod types;

pub use loader::SkeletonConfig;
pub use types::ParentReference;
