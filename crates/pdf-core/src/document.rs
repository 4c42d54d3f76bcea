//! PDF Document wrapper

use crate::{PdfError, Result, INHERITABLE_PAGE_KEYS};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Compare two sizes allowing for real-number rounding in the file
    pub fn approx_eq(&self, other: &PageSize, tolerance: f64) -> bool {
        (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}

/// PDF Document wrapper providing page-level operations
#[derive(Debug, Clone)]
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
}

impl PdfDocument {
    /// Open a PDF document from a file path
    ///
    /// # Arguments
    /// * `path` - Path to the PDF file
    ///
    /// # Example
    /// ```ignore
    /// let doc = PdfDocument::open("page2.pdf")?;
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let inner = Document::load(path)
            .map_err(|e| PdfError::OpenError(format!("{}: {}", path.display(), e)))?;

        Ok(Self { inner })
    }

    /// Open a PDF document from bytes
    ///
    /// # Arguments
    /// * `data` - PDF file bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;

        Ok(Self { inner })
    }

    /// Wrap an already loaded lopdf document
    pub fn from_document(inner: Document) -> Self {
        Self { inner }
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Get all page object IDs in order
    pub fn get_page_ids(&self) -> Vec<ObjectId> {
        let pages = self.inner.get_pages();
        pages.values().copied().collect()
    }

    /// Get the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    /// Get page dimensions in points
    ///
    /// Reads the MediaBox (or CropBox), following the parent chain when the
    /// page inherits it from its Pages node.
    pub fn page_size(&self, page: usize) -> Result<PageSize> {
        let page_id = self.page_id(page)?;
        let media_box = find_inherited(&self.inner, page_id, b"MediaBox")?
            .or(find_inherited(&self.inner, page_id, b"CropBox")?)
            .ok_or_else(|| PdfError::ParseError(format!("Page {page} has no MediaBox")))?;

        let array = match media_box {
            Object::Array(arr) => arr,
            Object::Reference(ref_id) => self
                .inner
                .get_object(ref_id)?
                .as_array()
                .map_err(|_| PdfError::ParseError("MediaBox reference is not an array".to_string()))?
                .clone(),
            _ => return Err(PdfError::ParseError("MediaBox is not an array".to_string())),
        };

        extract_size_from_media_box(&array)
    }

    /// Get the decoded content stream bytes of a page
    ///
    /// Array contents are concatenated in order.
    pub fn page_content(&self, page: usize) -> Result<Vec<u8>> {
        let page_id = self.page_id(page)?;
        let page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            Err(_) => return Ok(Vec::new()),
        };

        let mut combined = Vec::new();
        match contents {
            Object::Array(arr) => {
                for obj in arr {
                    combined.extend_from_slice(&self.stream_bytes(obj)?);
                }
            }
            other => combined = self.stream_bytes(other)?,
        }

        Ok(combined)
    }

    /// Import the first page of `other` as the last page of this document
    ///
    /// The imported objects are renumbered above this document's ids but are
    /// otherwise copied unchanged. Attributes the page inherited from its old
    /// page tree are copied onto the page itself so it renders the same.
    ///
    /// Returns the new page number (1-indexed).
    pub fn append_page_from(&mut self, other: &PdfDocument) -> Result<usize> {
        let mut source = other.inner.clone();
        let source_page = *source
            .get_pages()
            .get(&1)
            .ok_or(PdfError::InvalidPage(1, 0))?;

        // Pin inherited attributes before the page leaves its tree
        let mut pinned = Vec::new();
        for key in INHERITABLE_PAGE_KEYS {
            if let Some(value) = find_inherited(&source, source_page, key)? {
                pinned.push((key, value));
            }
        }
        {
            let page_dict = source
                .get_object_mut(source_page)?
                .as_dict_mut()
                .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;
            for (key, value) in pinned {
                if !page_dict.has(key) {
                    page_dict.set(key.to_vec(), value);
                }
            }
        }

        source.renumber_objects_with(self.inner.max_id + 1);
        let imported_page = *source
            .get_pages()
            .get(&1)
            .ok_or(PdfError::InvalidPage(1, 0))?;

        let pages_id = self.pages_root_id()?;

        for (id, object) in source.objects {
            if is_page_tree_node(&object) {
                continue;
            }
            self.inner.objects.insert(id, object);
        }
        self.inner.max_id = self
            .inner
            .objects
            .keys()
            .map(|(num, _)| *num)
            .max()
            .unwrap_or(0);

        let page_dict = self
            .inner
            .get_object_mut(imported_page)?
            .as_dict_mut()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;
        page_dict.set("Parent", Object::Reference(pages_id));

        self.push_page_to_tree(pages_id, imported_page)?;
        self.inner.prune_objects();

        Ok(self.page_count())
    }

    /// Resolve a page number (1-indexed) to its object id
    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Get the root Pages object id via the trailer's catalog
    fn pages_root_id(&self) -> Result<ObjectId> {
        let trailer =
            self.inner.trailer.get(b"Root").map_err(|_| {
                PdfError::ParseError("Document trailer missing Root entry".to_string())
            })?;
        let catalog_id = trailer
            .as_reference()
            .map_err(|_| PdfError::ParseError("Root is not a reference".to_string()))?;
        let catalog_obj = self.inner.get_object(catalog_id)?;
        let catalog_dict = catalog_obj
            .as_dict()
            .map_err(|_| PdfError::ParseError("Catalog is not a dictionary".to_string()))?;
        let pages_ref = catalog_dict
            .get(b"Pages")
            .map_err(|_| PdfError::ParseError("Catalog missing Pages entry".to_string()))?;

        pages_ref
            .as_reference()
            .map_err(|_| PdfError::ParseError("Pages is not a reference".to_string()))
    }

    /// Append a page reference to the root Kids array and bump Count
    fn push_page_to_tree(&mut self, pages_id: ObjectId, page_id: ObjectId) -> Result<()> {
        let pages_obj = self.inner.get_object(pages_id)?;
        let pages_dict = pages_obj
            .as_dict()
            .map_err(|_| PdfError::ParseError("Pages object is not a dictionary".to_string()))?;

        let kids = pages_dict
            .get(b"Kids")
            .map_err(|_| PdfError::ParseError("Pages object missing Kids array".to_string()))?;
        let mut kids_array = kids
            .as_array()
            .map_err(|_| PdfError::ParseError("Kids is not an array".to_string()))?
            .clone();
        kids_array.push(Object::Reference(page_id));

        let count = pages_dict
            .get(b"Count")
            .map_err(|_| PdfError::ParseError("Pages object missing Count".to_string()))?;
        let current_count = count
            .as_i64()
            .map_err(|_| PdfError::ParseError("Count is not an integer".to_string()))?;

        let mut new_pages_dict = pages_dict.clone();
        new_pages_dict.set("Kids", Object::Array(kids_array));
        new_pages_dict.set("Count", Object::Integer(current_count + 1));

        self.inner.objects.insert(pages_id, new_pages_dict.into());

        Ok(())
    }

    /// Decoded bytes of a content stream object or reference
    fn stream_bytes(&self, obj: &Object) -> Result<Vec<u8>> {
        let stream = match obj {
            Object::Stream(stream) => stream,
            Object::Reference(ref_id) => match self.inner.get_object(*ref_id)? {
                Object::Stream(stream) => stream,
                _ => return Err(PdfError::ParseError("Contents is not a stream".to_string())),
            },
            _ => return Err(PdfError::ParseError("Contents is not a stream".to_string())),
        };

        Ok(stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone()))
    }
}

/// Look up a page attribute, following the parent inheritance chain
fn find_inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
    let mut current_id = page_id;

    // Follow parent chain up to 10 levels (safety limit)
    for _ in 0..10 {
        let obj = doc.get_object(current_id)?;
        let dict = obj
            .as_dict()
            .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value.clone()));
        }

        if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
            current_id = *parent_id;
            continue;
        }

        break;
    }

    Ok(None)
}

/// Whether an object is a Catalog or an intermediate Pages node
fn is_page_tree_node(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => matches!(
            dict.get(b"Type").and_then(|t| t.as_name()),
            Ok(b"Catalog") | Ok(b"Pages")
        ),
        _ => false,
    }
}

/// Extract width and height from a MediaBox array
fn extract_size_from_media_box(media_box_array: &[Object]) -> Result<PageSize> {
    if media_box_array.len() < 4 {
        return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
    }

    let coord = |index: usize| -> Result<f64> {
        media_box_array[index]
            .as_f32()
            .map(|v| v as f64)
            .ok()
            .or_else(|| media_box_array[index].as_i64().ok().map(|v| v as f64))
            .ok_or_else(|| PdfError::ParseError(format!("Invalid MediaBox entry {index}")))
    };

    let (x1, y1, x2, y2) = (coord(0)?, coord(1)?, coord(2)?, coord(3)?);
    Ok(PageSize::new((x2 - x1).abs(), (y2 - y1).abs()))
}
