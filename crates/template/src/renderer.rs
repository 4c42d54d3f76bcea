//! SVG to PDF rendering

use crate::fonts::{apply_font_policy, FontResolver, FontSubstitution};
use crate::{Result, SvgTemplate, TemplateError};
use pdf_core::{PageSize, PdfDocument};
use tracing::{debug, info};

/// Allowed difference between the SVG canvas and the PDF page, in points
pub const SIZE_TOLERANCE_PT: f64 = 0.01;

/// A filled template rendered to a single PDF page
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub document: PdfDocument,
    /// Page size in points; equals the SVG canvas size
    pub size: PageSize,
    /// Fonts that were replaced by the default family
    pub font_substitutions: Vec<FontSubstitution>,
}

/// Converts filled SVG templates into one-page PDFs
pub struct PageRenderer<'a> {
    fonts: &'a dyn FontResolver,
}

impl<'a> PageRenderer<'a> {
    pub fn new(fonts: &'a dyn FontResolver) -> Self {
        Self { fonts }
    }

    /// Render the template to a PDF page of the same dimensions
    ///
    /// Unavailable fonts are replaced by the resolver's default family
    /// before parsing; the substitutions are logged and returned.
    pub fn render(&self, template: &SvgTemplate) -> Result<RenderedPage> {
        let (markup, font_substitutions) = apply_font_policy(template.markup(), self.fonts)?;

        let options = usvg::Options {
            resources_dir: template
                .source()
                .and_then(|p| p.parent())
                .map(|p| p.to_path_buf()),
            font_family: self.fonts.default_family().to_string(),
            fontdb: self.fonts.database(),
            ..usvg::Options::default()
        };

        let tree = usvg::Tree::from_str(&markup, &options)
            .map_err(|e| TemplateError::RenderError(format!("invalid SVG: {e}")))?;

        let canvas = tree.size();
        if canvas.width() <= 0.0 || canvas.height() <= 0.0 {
            return Err(TemplateError::RenderError(format!(
                "invalid SVG dimensions: {}x{}",
                canvas.width(),
                canvas.height()
            )));
        }
        debug!(width = canvas.width(), height = canvas.height(), "SVG parsed");

        let pdf_data = svg2pdf::to_pdf(
            &tree,
            svg2pdf::ConversionOptions::default(),
            svg2pdf::PageOptions::default(),
        )
        .map_err(|e| TemplateError::RenderError(format!("conversion failed: {e}")))?;

        let document = PdfDocument::open_from_bytes(&pdf_data)?;
        if document.page_count() != 1 {
            return Err(TemplateError::RenderError(format!(
                "renderer produced {} pages, expected 1",
                document.page_count()
            )));
        }

        let expected = PageSize::new(f64::from(canvas.width()), f64::from(canvas.height()));
        let size = document.page_size(1)?;
        if !size.approx_eq(&expected, SIZE_TOLERANCE_PT) {
            return Err(TemplateError::RenderError(format!(
                "page is {}x{} pt but the template canvas is {}x{}",
                size.width, size.height, expected.width, expected.height
            )));
        }

        info!(
            width = size.width,
            height = size.height,
            bytes = pdf_data.len(),
            substitutions = font_substitutions.len(),
            "page rendered"
        );

        Ok(RenderedPage {
            document,
            size,
            font_substitutions,
        })
    }
}
