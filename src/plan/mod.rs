//! Turning a resolved skeleton into filesystem operations.
//!
//! Building a plan reads the target filesystem but never writes to it. The
//! plan is applied once, to the real filesystem or to memory.

pub mod apply;
pub mod operation;
mod processor;

use crate::error::Result;
use crate::ext::PathExt;
use crate::fs::FileSystem;
use crate::renderer::{new_renderer, TemplateRenderer};
use crate::skeleton::{ResolvedSkeleton, SkeletonFile};
use crate::values::{merge_values, Values};
use chrono::Datelike;
use log::debug;
use processor::PathProcessor;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use apply::ApplyStats;
pub use operation::{Action, ActionCounts, Destination, Operation};

/// Identity of the generated project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub name: String,
    pub owner: String,
    pub year: i32,
}

impl ProjectInfo {
    /// Project info dated with the current year.
    pub fn new(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self { name: name.into(), owner: owner.into(), year: chrono::Local::now().year() }
    }
}

/// Everything besides the skeleton that shapes a plan.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub target: PathBuf,
    pub project: ProjectInfo,
    /// Merged over the skeleton's values, winning on conflicts.
    pub overrides: Values,
    /// License key exposed to templates as `license.key`.
    pub license: Option<String>,
    /// Generated entries; they replace skeleton entries at the same path.
    pub extra_files: Vec<SkeletonFile>,
    pub force_overwrite: bool,
    /// Destinations, or directories of destinations, that may be overwritten.
    pub overwrite: Vec<PathBuf>,
    /// Destinations, or directories of destinations, that are never written.
    pub skip: Vec<PathBuf>,
}

impl PlanOptions {
    pub fn new<P: Into<PathBuf>>(target: P, project: ProjectInfo) -> Self {
        Self {
            target: target.into(),
            project,
            overrides: Values::new(),
            license: None,
            extra_files: Vec::new(),
            force_overwrite: false,
            overwrite: Vec::new(),
            skip: Vec::new(),
        }
    }

    pub fn with_overrides(mut self, overrides: Values) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_license(mut self, key: impl Into<String>) -> Self {
        self.license = Some(key.into());
        self
    }

    pub fn with_extra_file(mut self, file: SkeletonFile) -> Self {
        self.extra_files.push(file);
        self
    }

    pub fn with_force_overwrite(mut self, force: bool) -> Self {
        self.force_overwrite = force;
        self
    }

    pub fn with_overwrite<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.overwrite.push(path.into());
        self
    }

    pub fn with_skip<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.skip.push(path.into());
        self
    }
}

/// Ordered operations ready to be applied once.
pub struct Plan {
    target: PathBuf,
    operations: Vec<Operation>,
    counts: ActionCounts,
    context: Value,
    renderer: Box<dyn TemplateRenderer>,
}

impl Plan {
    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn counts(&self) -> ActionCounts {
        self.counts
    }

    /// Context templates are rendered against.
    pub fn context(&self) -> &Value {
        &self.context
    }
}

impl std::fmt::Debug for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plan")
            .field("target", &self.target)
            .field("operations", &self.operations)
            .field("counts", &self.counts)
            .finish_non_exhaustive()
    }
}

/// Builds the render context with the `project`, `values` and `license` namespaces.
pub fn render_context(skeleton: &ResolvedSkeleton, options: &PlanOptions) -> Value {
    let values = merge_values(skeleton.values(), &options.overrides);
    json!({
        "project": {
            "name": options.project.name,
            "owner": options.project.owner,
            "year": options.project.year,
        },
        "values": values,
        "license": options.license.as_ref().map(|key| json!({ "key": key })),
    })
}

/// Plans how `skeleton` materializes under `options.target`.
///
/// Existing destinations are looked up in `fs`; nothing is written.
pub fn build_plan(
    skeleton: &ResolvedSkeleton,
    options: &PlanOptions,
    fs: &dyn FileSystem,
) -> Result<Plan> {
    build_plan_with(Box::new(new_renderer()), skeleton, options, fs)
}

/// Same as [`build_plan`] with a custom renderer.
pub fn build_plan_with(
    renderer: Box<dyn TemplateRenderer>,
    skeleton: &ResolvedSkeleton,
    options: &PlanOptions,
    fs: &dyn FileSystem,
) -> Result<Plan> {
    let context = render_context(skeleton, options);

    let mut files: BTreeMap<PathBuf, SkeletonFile> =
        skeleton.files().iter().map(|file| (file.path.clone(), file.clone())).collect();
    for extra in &options.extra_files {
        files.insert(extra.path.clone(), extra.clone());
    }

    let overwrite = relative_entries(&options.target, &options.overwrite);
    let skip = relative_entries(&options.target, &options.skip);

    let mut operations = Vec::with_capacity(files.len());
    let mut counts = ActionCounts::default();
    {
        let mut processor = PathProcessor::new(renderer.as_ref(), &context);
        for file in files.into_values() {
            let relative = processor.destination(&file)?;
            let destination = Destination { root: options.target.clone(), relative };

            let covered = |entries: &[PathBuf]| {
                entries.iter().any(|entry| destination.relative.starts_with(entry))
            };
            let action = if covered(&skip) {
                Action::SkipRequested
            } else if fs.exists(&destination.path())? {
                if options.force_overwrite || covered(&overwrite) {
                    Action::Overwrite
                } else {
                    Action::SkipExisting
                }
            } else {
                Action::Create
            };

            debug!("Planned {:?} for '{}'", action, destination.relative.display());
            counts.record(action);
            operations.push(Operation { file, destination, action });
        }
    }

    Ok(Plan { target: options.target.clone(), operations, counts, context, renderer })
}

/// Expresses user-supplied paths relative to the target directory.
fn relative_entries(target: &Path, entries: &[PathBuf]) -> Vec<PathBuf> {
    let target = target.clean();
    entries
        .iter()
        .map(|entry| {
            let entry = entry.clean();
            entry.strip_prefix(&target).map(Path::to_path_buf).unwrap_or(entry)
        })
        .collect()
}
