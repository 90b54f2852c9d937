use crate::constants::permissions;
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::fs::FileSystem;
use crate::plan::Plan;
use crate::skeleton::{FileSource, SkeletonFile};
use log::{debug, info};

/// What applying a plan did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ApplyStats {
    pub directories_created: usize,
    pub files_written: usize,
    /// Files among `files_written` whose content was rendered.
    pub files_rendered: usize,
    pub skipped: usize,
}

impl Plan {
    /// Applies the operations in order.
    ///
    /// Writes are not rolled back: an error leaves earlier operations applied.
    pub fn apply(self, fs: &mut dyn FileSystem) -> Result<ApplyStats> {
        let mut stats = ApplyStats::default();
        for operation in &self.operations {
            if operation.action.is_skip() {
                debug!("{}", operation.message());
                stats.skipped += 1;
                continue;
            }
            info!("{}", operation.message());

            let file = &operation.file;
            let destination = operation.destination.path();
            if file.is_dir() {
                fs.create_dir_all(&destination, file.permissions)?;
                stats.directories_created += 1;
                continue;
            }

            if let Some(parent) = destination.parent() {
                fs.create_dir_all(parent, permissions::DIRECTORY)?;
            }
            let content = self.content(file)?;
            fs.write_file(&destination, &content)?;
            fs.set_permissions(&destination, file.permissions)?;

            stats.files_written += 1;
            if file.is_template() {
                stats.files_rendered += 1;
            }
        }
        Ok(stats)
    }

    /// Bytes to write for `file`: rendered for templates, verbatim otherwise.
    fn content(&self, file: &SkeletonFile) -> Result<Vec<u8>> {
        let raw = match &file.source {
            FileSource::Disk(path) => std::fs::read(path)?,
            FileSource::Generated(content) => content.clone().into_bytes(),
        };
        if !file.is_template() {
            return Ok(raw);
        }

        let template_name = file.path.to_slash_string();
        let template = String::from_utf8(raw).map_err(|e| Error::ProcessError {
            source_path: template_name.clone(),
            e: e.to_string(),
        })?;
        Ok(self.renderer.render(&template, &self.context, &template_name)?.into_bytes())
    }
}
