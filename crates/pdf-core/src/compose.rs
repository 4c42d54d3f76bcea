//! Two-page composition and artifact output

use crate::{PageSize, PdfDocument, PdfError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A pre-existing single-page document that is merged unchanged
#[derive(Debug, Clone)]
pub struct StaticPage {
    document: PdfDocument,
    source: Option<PathBuf>,
}

impl StaticPage {
    /// Load the static page from a file
    ///
    /// Fails when the file cannot be read, is not a PDF, or does not contain
    /// exactly one page.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            PdfError::OpenError(format!("cannot read static page {}: {}", path.display(), e))
        })?;

        let mut page = Self::from_bytes(&data)?;
        page.source = Some(path.to_path_buf());
        Ok(page)
    }

    /// Load the static page from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = PdfDocument::open_from_bytes(data)?;
        ensure_single_page(&document, "static page")?;

        Ok(Self {
            document,
            source: None,
        })
    }

    /// The underlying document
    pub fn document(&self) -> &PdfDocument {
        &self.document
    }

    /// Where the page was loaded from, if it came from disk
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Page dimensions in points
    pub fn size(&self) -> Result<PageSize> {
        self.document.page_size(1)
    }
}

/// The final composed document
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    bytes: Vec<u8>,
    page_count: usize,
}

impl OutputArtifact {
    /// Serialized PDF bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of pages in the artifact
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Write the artifact, replacing any file already at `path`
    ///
    /// The bytes go to a temporary file in the destination directory which is
    /// then renamed over `path`, so readers never see a partial file.
    pub fn write_atomic<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&self.bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| PdfError::IoError(e.error))?;

        debug!(path = %path.display(), bytes = self.bytes.len(), "artifact written");
        Ok(())
    }
}

/// Merge a rendered first page with the static second page
///
/// The result always has exactly two pages in the order `[first, second]`.
/// The static page's objects are imported without being re-rendered.
pub fn compose(first: &PdfDocument, second: &StaticPage) -> Result<OutputArtifact> {
    ensure_single_page(first, "rendered page")?;
    ensure_single_page(second.document(), "static page")?;

    let mut merged = first.clone();
    merged.append_page_from(second.document())?;

    let page_count = merged.page_count();
    if page_count != 2 {
        return Err(PdfError::ParseError(format!(
            "composed document has {page_count} pages, expected 2"
        )));
    }

    let bytes = merged.to_bytes()?;
    debug!(pages = page_count, bytes = bytes.len(), "pages composed");

    Ok(OutputArtifact { bytes, page_count })
}

fn ensure_single_page(document: &PdfDocument, what: &'static str) -> Result<()> {
    match document.page_count() {
        1 => Ok(()),
        found => Err(PdfError::NotSinglePage { what, found }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Object, Stream};

    fn empty_document() -> PdfDocument {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Count" => 0,
            "Kids" => Vec::<Object>::new(),
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        PdfDocument::from_document(doc)
    }

    fn one_page_bytes() -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let contents_id = doc.add_object(Stream::new(dictionary! {}, b"0 0 m 10 10 l S".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 100.into(), 50.into()],
            "Contents" => contents_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => 1,
                "Kids" => vec![page_id.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_compose_rejects_empty_first_page() {
        let back = StaticPage::from_bytes(&one_page_bytes()).unwrap();
        let err = compose(&empty_document(), &back).unwrap_err();
        assert!(matches!(
            err,
            PdfError::NotSinglePage {
                what: "rendered page",
                found: 0
            }
        ));
    }

    #[test]
    fn test_static_page_from_invalid_bytes() {
        let err = StaticPage::from_bytes(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, PdfError::OpenError(_)));
    }

    #[test]
    fn test_compose_two_pages() {
        let front = PdfDocument::open_from_bytes(&one_page_bytes()).unwrap();
        let back = StaticPage::from_bytes(&one_page_bytes()).unwrap();
        let artifact = compose(&front, &back).unwrap();
        assert_eq!(artifact.page_count(), 2);

        let reopened = PdfDocument::open_from_bytes(artifact.as_bytes()).unwrap();
        assert_eq!(reopened.page_count(), 2);
    }
}
