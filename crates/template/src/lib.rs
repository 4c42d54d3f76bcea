//! Template Engine - SVG template filling and rendering
//!
//! This crate provides:
//! - Loading SVG templates ([`SvgTemplate`])
//! - Locating the four card fields by element id ([`TemplateIndex`])
//! - Replacing field text without touching the rest of the markup ([`substitute`])
//! - Font availability checks with fallback ([`FontResolver`])
//! - Conversion of the filled template to a one-page PDF ([`PageRenderer`])
//!
//! # Example
//!
//! ```ignore
//! use template::{substitute, FieldMap, HostFontResolver, PageRenderer, SvgTemplate};
//!
//! let template = SvgTemplate::load("page1.svg")?;
//! let fields = FieldMap::new("Jane Smith", "1985-06-20", "2026-02-01", "2026-02-08");
//! let filled = substitute(template, &fields)?;
//!
//! let fonts = HostFontResolver::builder().default_family("DejaVu Sans").build();
//! let page = PageRenderer::new(&fonts).render(&filled)?;
//! ```

mod fields;
mod fonts;
mod index;
mod renderer;
mod substitute;
mod svg;

pub use fields::{FieldId, FieldMap};
pub use fonts::{
    apply_font_policy, FontResolver, FontSubstitution, HostFontResolver, HostFontResolverBuilder,
    ResolvedFont,
};
pub use index::{FieldElement, TemplateIndex, TEXT_BEARING_TAGS};
pub use renderer::{PageRenderer, RenderedPage, SIZE_TOLERANCE_PT};
pub use substitute::substitute;
pub use svg::SvgTemplate;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during template processing
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read template {}: {source}", .path.display())]
    LoadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse template: {0}")]
    ParseError(String),

    #[error("Field '{0}' not found in template")]
    MissingField(FieldId),

    #[error("Field '{field}' is ambiguous: {count} elements carry this id")]
    AmbiguousField { field: FieldId, count: usize },

    #[error("Field '{field}' is on a <{tag}> element, which cannot hold text")]
    NotTextBearing { field: FieldId, tag: String },

    #[error("Field '{inner}' is nested inside field '{outer}'")]
    NestedField { outer: FieldId, inner: FieldId },

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("PDF error: {0}")]
    PdfError(#[from] pdf_core::PdfError),
}

impl TemplateError {
    /// Whether the error points at a defect in the template itself
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            TemplateError::LoadError { .. }
                | TemplateError::ParseError(_)
                | TemplateError::MissingField(_)
                | TemplateError::AmbiguousField { .. }
                | TemplateError::NotTextBearing { .. }
                | TemplateError::NestedField { .. }
        )
    }
}

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;

pub(crate) fn xml_error(err: impl std::fmt::Display, position: usize) -> TemplateError {
    TemplateError::ParseError(format!("at byte {position}: {err}"))
}
