use crate::constants::TEMPLATE_SUFFIX;
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::renderer::TemplateRenderer;
use crate::skeleton::SkeletonFile;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Renders destination paths of skeleton entries, one entry at a time.
///
/// Entries must arrive sorted by path so that every directory is rendered
/// before its descendants.
pub(crate) struct PathProcessor<'a> {
    renderer: &'a dyn TemplateRenderer,
    context: &'a serde_json::Value,
    /// Original directory path to its rendered counterpart.
    rendered_dirs: HashMap<PathBuf, PathBuf>,
}

impl<'a> PathProcessor<'a> {
    pub fn new(renderer: &'a dyn TemplateRenderer, context: &'a serde_json::Value) -> Self {
        Self { renderer, context, rendered_dirs: HashMap::new() }
    }

    /// Computes the relative destination of `file`.
    ///
    /// Only the base name is rendered; the parent comes from the already
    /// rendered directory. A rendered name that leaves the parent is rejected.
    pub fn destination(&mut self, file: &SkeletonFile) -> Result<PathBuf> {
        let template_name = file.path.to_slash_string();
        let name = file
            .path
            .file_name()
            .ok_or_else(|| Error::ProcessError {
                source_path: template_name.clone(),
                e: "entry has no file name".to_string(),
            })?
            .to_str()
            .ok_or_else(|| Error::InvalidUnicodePath(template_name.clone()))?;

        let rendered = self.renderer.render(name, self.context, &template_name)?;
        if rendered.is_empty() {
            return Err(Error::EmptyRenderResult { path: template_name });
        }

        let original_parent = file.path.parent().unwrap_or(Path::new(""));
        let parent = self
            .rendered_dirs
            .get(original_parent)
            .cloned()
            .unwrap_or_else(|| original_parent.to_path_buf());

        let candidate = parent.join(&rendered).clean();
        if candidate.file_name().is_none() || candidate.parent() != Some(parent.clean().as_path())
        {
            return Err(Error::PathInjection { path: template_name, rendered });
        }

        let destination = strip_template_suffix(&candidate)
            .ok_or(Error::EmptyRenderResult { path: template_name })?;
        if file.is_dir() {
            self.rendered_dirs.insert(file.path.clone(), destination.clone());
        }
        Ok(destination)
    }
}

/// Removes the template suffix from the last component. `None` if nothing
/// but the suffix remains.
fn strip_template_suffix(path: &Path) -> Option<PathBuf> {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return Some(path.to_path_buf());
    };
    match name.strip_suffix(TEMPLATE_SUFFIX) {
        Some("") => None,
        Some(stripped) => Some(path.with_file_name(stripped)),
        None => Some(path.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::MiniJinjaRenderer;
    use crate::skeleton::FileKind;
    use serde_json::json;

    fn entry(path: &str, kind: FileKind) -> SkeletonFile {
        SkeletonFile { kind, ..SkeletonFile::generated(path, "") }
    }

    fn render_one(name: &str, context: serde_json::Value) -> Result<PathBuf> {
        let renderer = MiniJinjaRenderer::new();
        let mut processor = PathProcessor::new(&renderer, &context);
        processor.destination(&entry(name, FileKind::Regular))
    }

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(render_one("normalname", json!({})).unwrap(), PathBuf::from("normalname"));
    }

    #[test]
    fn suffix_is_stripped_after_rendering() {
        let context = json!({"project": {"name": "widget"}});
        assert_eq!(
            render_one("{{ project.name }}.go.skel", context).unwrap(),
            PathBuf::from("widget.go")
        );
    }

    #[test]
    fn empty_render_is_rejected() {
        let err = render_one("{% if false %}x{% endif %}", json!({})).unwrap_err();
        assert!(matches!(err, Error::EmptyRenderResult { .. }));

        let err = render_one(".skel", json!({})).unwrap_err();
        assert!(matches!(err, Error::EmptyRenderResult { .. }));
    }

    #[test]
    fn escaping_names_are_rejected() {
        for evil in ["../../escape", "..", "/etc/passwd", "a/b", "."] {
            let err = render_one("{{ values.name }}", json!({"values": {"name": evil}}))
                .unwrap_err();
            assert!(
                matches!(err, Error::PathInjection { ref rendered, .. } if rendered == evil),
                "{evil} should be rejected, got {err}"
            );
        }
    }

    #[test]
    fn descendants_follow_renamed_directories() {
        let renderer = MiniJinjaRenderer::new();
        let context = json!({"values": {"pkg": "billing"}});
        let mut processor = PathProcessor::new(&renderer, &context);

        let dir = processor.destination(&entry("src/{{ values.pkg }}", FileKind::Directory));
        assert_eq!(dir.unwrap(), PathBuf::from("src/billing"));
        let file = processor.destination(&entry("src/{{ values.pkg }}/mod.rs", FileKind::Regular));
        assert_eq!(file.unwrap(), PathBuf::from("src/billing/mod.rs"));
    }

    #[test]
    fn undefined_values_fail_in_names() {
        let err = render_one("{{ values.missing }}", json!({"values": {}})).unwrap_err();
        assert!(matches!(err, Error::TemplateError(_)));
    }
}
