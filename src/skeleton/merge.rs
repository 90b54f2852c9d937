//! Deep merge of skeletons.

use crate::error::{Error, Result};
use crate::skeleton::model::{ResolvedSkeleton, SkeletonFile};
use crate::values::merge_values;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Merges files by relative path. Entries of `top` replace entries of `base`
/// at the same path, entries only present in `base` are kept and flagged
/// inherited.
pub fn merge_files(base: &[SkeletonFile], top: Vec<SkeletonFile>) -> Vec<SkeletonFile> {
    let mut merged: BTreeMap<PathBuf, SkeletonFile> = base
        .iter()
        .map(|file| (file.path.clone(), SkeletonFile { inherited: true, ..file.clone() }))
        .collect();
    for file in top {
        merged.insert(file.path.clone(), file);
    }
    merged.into_values().collect()
}

/// Layers `top` over `base`.
///
/// Values and files merge with `top` winning, description and reference are
/// always taken from `top`.
pub fn overlay(base: &ResolvedSkeleton, top: &ResolvedSkeleton) -> ResolvedSkeleton {
    ResolvedSkeleton::new(
        top.description().to_string(),
        merge_values(base.values(), top.values()),
        merge_files(base.files(), top.files().to_vec()),
        top.reference().clone(),
        top.parent().cloned().map(Box::new),
    )
}

/// Places `child` on top of its loaded `parent`, keeping the parent for provenance.
pub(crate) fn inherit(parent: ResolvedSkeleton, child: ResolvedSkeleton) -> ResolvedSkeleton {
    let values = merge_values(&parent.values, &child.values);
    let files = merge_files(&parent.files, child.files);
    ResolvedSkeleton::new(
        child.description,
        values,
        files,
        child.reference,
        Some(Box::new(parent)),
    )
}

/// Composes independent skeletons left to right, later ones winning.
pub fn compose_skeletons(skeletons: Vec<ResolvedSkeleton>) -> Result<ResolvedSkeleton> {
    let mut skeletons = skeletons.into_iter();
    let first = skeletons.next().ok_or(Error::NoSkeletons)?;
    Ok(skeletons.fold(first, |composed, next| overlay(&composed, &next)))
}
