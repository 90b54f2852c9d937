use crate::skeleton::SkeletonFile;
use std::path::PathBuf;

/// What applying an operation does with its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Overwrite,
    /// The destination exists and overwriting was not allowed.
    SkipExisting,
    /// The destination is covered by the skip list.
    SkipRequested,
}

impl Action {
    pub fn is_skip(self) -> bool {
        matches!(self, Action::SkipExisting | Action::SkipRequested)
    }
}

/// Output location of one skeleton entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub root: PathBuf,
    /// Rendered path with the template suffix stripped.
    pub relative: PathBuf,
}

impl Destination {
    pub fn path(&self) -> PathBuf {
        self.root.join(&self.relative)
    }
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub file: SkeletonFile,
    pub destination: Destination,
    pub action: Action,
}

impl Operation {
    /// Describes the operation for logs and previews.
    pub fn message(&self) -> String {
        let target = self.destination.path();
        let target = target.display();
        let source = self.file.path.display();

        let verb = match self.action {
            Action::SkipExisting => return format!("Skipping '{target}' (already exists)"),
            Action::SkipRequested => return format!("Skipping '{target}' (excluded)"),
            _ if self.file.is_dir() => return format!("Creating directory '{target}'"),
            _ if self.file.is_template() => "Rendering",
            _ => "Copying",
        };

        if self.action == Action::Overwrite {
            format!("{verb} '{source}' to '{target}' (overwriting existing file)")
        } else {
            format!("{verb} '{source}' to '{target}'")
        }
    }
}

/// Number of operations per action.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ActionCounts {
    pub create: usize,
    pub overwrite: usize,
    pub skip_existing: usize,
    pub skip_requested: usize,
}

impl ActionCounts {
    pub fn record(&mut self, action: Action) {
        match action {
            Action::Create => self.create += 1,
            Action::Overwrite => self.overwrite += 1,
            Action::SkipExisting => self.skip_existing += 1,
            Action::SkipRequested => self.skip_requested += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.create + self.overwrite + self.skip_existing + self.skip_requested
    }
}
