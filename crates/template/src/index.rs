//! Field lookup over template markup

use crate::{xml_error, FieldId, Result, TemplateError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

/// SVG elements that can carry character content
pub const TEXT_BEARING_TAGS: [&str; 3] = ["text", "tspan", "textPath"];

/// One element in the template tagged with a field id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldElement {
    /// The field this element carries
    pub field: FieldId,
    /// Local element name, e.g. `text` or `tspan`
    pub tag: String,
    /// Byte offset of the element's start tag in the markup
    pub offset: usize,
    /// Whether the element was written as `<tag ... />`
    pub self_closing: bool,
}

impl FieldElement {
    /// Whether the element can hold text content
    pub fn is_text_bearing(&self) -> bool {
        TEXT_BEARING_TAGS.contains(&self.tag.as_str())
    }
}

/// Index of field elements, built once per loaded template
///
/// Every lookup goes through [`TemplateIndex::find_unique`], which is the
/// only place the "exactly one text element per field" rule is enforced.
#[derive(Debug, Clone, Default)]
pub struct TemplateIndex {
    entries: HashMap<FieldId, Vec<FieldElement>>,
}

impl TemplateIndex {
    /// Scan markup for elements whose `id` is a field identifier
    ///
    /// Fails with `ParseError` on malformed XML and with `NestedField` when
    /// one field element sits inside another.
    pub fn build(markup: &str) -> Result<Self> {
        let mut reader = Reader::from_str(markup);
        let mut entries: HashMap<FieldId, Vec<FieldElement>> = HashMap::new();

        // (field, depth) of the field element currently open, if any
        let mut open_field: Option<(FieldId, usize)> = None;
        let mut depth = 0usize;

        loop {
            let offset = reader.buffer_position();
            let event = reader
                .read_event()
                .map_err(|e| xml_error(e, reader.buffer_position()))?;

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let self_closing = matches!(event, Event::Empty(_));
                    if let Some(field) = field_of(e, offset)? {
                        if let Some((outer, _)) = open_field {
                            return Err(TemplateError::NestedField {
                                outer,
                                inner: field,
                            });
                        }
                        entries.entry(field).or_default().push(FieldElement {
                            field,
                            tag: local_name(e),
                            offset,
                            self_closing,
                        });
                        if !self_closing {
                            open_field = Some((field, depth));
                        }
                    }
                    if !self_closing {
                        depth += 1;
                    }
                }
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    if matches!(open_field, Some((_, d)) if d == depth) {
                        open_field = None;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if depth != 0 {
            return Err(TemplateError::ParseError(format!(
                "{depth} element(s) left unclosed"
            )));
        }

        Ok(Self { entries })
    }

    /// The single text element carrying `field`
    pub fn find_unique(&self, field: FieldId) -> Result<&FieldElement> {
        let matches = self.entries.get(&field).map(Vec::as_slice).unwrap_or(&[]);

        match matches {
            [] => Err(TemplateError::MissingField(field)),
            [element] if element.is_text_bearing() => Ok(element),
            [element] => Err(TemplateError::NotTextBearing {
                field,
                tag: element.tag.clone(),
            }),
            many => Err(TemplateError::AmbiguousField {
                field,
                count: many.len(),
            }),
        }
    }

    /// Resolve every field, failing on the first one that is not unique
    pub fn resolve_all(&self) -> Result<Vec<&FieldElement>> {
        FieldId::ALL
            .into_iter()
            .map(|field| self.find_unique(field))
            .collect()
    }

    /// Number of elements found for a field
    pub fn count(&self, field: FieldId) -> usize {
        self.entries.get(&field).map_or(0, Vec::len)
    }
}

fn field_of(element: &BytesStart, offset: usize) -> Result<Option<FieldId>> {
    let id = element
        .try_get_attribute("id")
        .map_err(|e| xml_error(e, offset))?;

    match id {
        Some(attr) => {
            let value = attr.unescape_value().map_err(|e| xml_error(e, offset))?;
            Ok(FieldId::from_element_id(value.trim()))
        }
        None => Ok(None),
    }
}

fn local_name(element: &BytesStart) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}
