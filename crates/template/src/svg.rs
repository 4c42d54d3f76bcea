//! SVG template documents

use crate::{Result, TemplateError, TemplateIndex};
use std::path::{Path, PathBuf};

/// An SVG template held as markup text
///
/// Each pipeline run loads its own copy; substitution consumes the template
/// and returns a new one, so values never leak between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgTemplate {
    markup: String,
    source: Option<PathBuf>,
}

impl SvgTemplate {
    /// Load a template from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let markup = std::fs::read_to_string(path).map_err(|source| TemplateError::LoadError {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            markup,
            source: Some(path.to_path_buf()),
        })
    }

    /// Create a template from markup held in memory
    pub fn from_markup(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            source: None,
        }
    }

    /// The SVG markup
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// The file this template was loaded from
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Build the field index for this markup
    pub fn index(&self) -> Result<TemplateIndex> {
        TemplateIndex::build(&self.markup)
    }

    /// Replace the markup, keeping the source path
    pub(crate) fn with_markup(self, markup: String) -> Self {
        Self {
            markup,
            source: self.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page1.svg");

        match SvgTemplate::load(&path) {
            Err(TemplateError::LoadError { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected LoadError, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page1.svg");
        std::fs::write(&path, "<svg xmlns=\"http://www.w3.org/2000/svg\"/>").unwrap();

        let template = SvgTemplate::load(&path).unwrap();
        assert_eq!(template.source(), Some(path.as_path()));
        assert!(template.markup().starts_with("<svg"));
    }

    #[test]
    fn test_with_markup_keeps_source() {
        let template = SvgTemplate::from_markup("<svg/>").with_markup("<svg></svg>".to_string());
        assert_eq!(template.markup(), "<svg></svg>");
        assert_eq!(template.source(), None);
    }
}
