//! Field text substitution

use crate::{xml_error, FieldMap, Result, SvgTemplate, TemplateError};
use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;
use tracing::debug;

/// Tracks the field element whose content is being replaced
struct Replacement<'v> {
    value: &'v str,
    /// Element depth relative to the field element (the field element is 1)
    depth: usize,
    /// Whether the value has been emitted yet
    written: bool,
    /// Depth of the kept `<tspan>` wrapper while inside it
    kept: Option<usize>,
}

/// Replace the text of the four field elements
///
/// Each field is located through [`crate::TemplateIndex::find_unique`], so a
/// missing, duplicated or non-text field fails before any markup is rewritten.
/// Inside a located element the first `<tspan>` child keeps its attributes
/// (position, style) and receives the value; all other child content is
/// dropped. Everything outside the four elements is copied through unchanged.
/// Values are escaped but not filtered: a character XML 1.0 forbids (most C0
/// controls) makes the filled markup unparseable at render time.
pub fn substitute(template: SvgTemplate, fields: &FieldMap) -> Result<SvgTemplate> {
    let index = template.index()?;

    let mut targets: HashMap<usize, &str> = HashMap::new();
    for (field, value) in fields.iter() {
        let element = index.find_unique(field)?;
        debug!(field = %field, tag = %element.tag, offset = element.offset, "field located");
        targets.insert(element.offset, value);
    }

    let markup = rewrite(template.markup(), &targets)?;
    Ok(template.with_markup(markup))
}

fn rewrite(markup: &str, targets: &HashMap<usize, &str>) -> Result<String> {
    let mut reader = Reader::from_str(markup);
    let mut writer = Writer::new(Vec::with_capacity(markup.len()));
    let mut active: Option<Replacement> = None;
    let mut replaced = 0usize;

    loop {
        let offset = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| xml_error(e, reader.buffer_position()))?;
        if matches!(event, Event::Eof) {
            break;
        }

        let mut out: Vec<Event> = Vec::new();
        match active.as_mut() {
            None => match event {
                Event::Start(e) if targets.contains_key(&offset) => {
                    out.push(Event::Start(e));
                    active = Some(Replacement {
                        value: targets[&offset],
                        depth: 1,
                        written: false,
                        kept: None,
                    });
                }
                Event::Empty(e) if targets.contains_key(&offset) => {
                    let end = e.to_end().into_owned();
                    out.push(Event::Start(e));
                    out.push(Event::Text(BytesText::new(targets[&offset])));
                    out.push(Event::End(end));
                    replaced += 1;
                }
                other => out.push(other),
            },
            Some(rep) => match event {
                Event::Start(e) => {
                    rep.depth += 1;
                    if !rep.written && rep.depth == 2 && is_tspan(e.local_name().as_ref()) {
                        out.push(Event::Start(e));
                        out.push(Event::Text(BytesText::new(rep.value)));
                        rep.written = true;
                        rep.kept = Some(rep.depth);
                    }
                }
                Event::Empty(e) => {
                    if !rep.written && rep.depth == 1 && is_tspan(e.local_name().as_ref()) {
                        let end = e.to_end().into_owned();
                        out.push(Event::Start(e));
                        out.push(Event::Text(BytesText::new(rep.value)));
                        out.push(Event::End(end));
                        rep.written = true;
                    }
                }
                Event::End(e) => {
                    if rep.kept == Some(rep.depth) {
                        out.push(Event::End(e.clone()));
                        rep.kept = None;
                    }
                    rep.depth -= 1;
                    if rep.depth == 0 {
                        if !rep.written {
                            out.push(Event::Text(BytesText::new(rep.value)));
                        }
                        out.push(Event::End(e));
                        active = None;
                        replaced += 1;
                    }
                }
                // Original character data, comments and CDATA inside a field are dropped
                _ => {}
            },
        }

        for ev in out {
            writer
                .write_event(ev)
                .map_err(|e| xml_error(e, offset))?;
        }
    }

    if replaced != targets.len() {
        return Err(TemplateError::ParseError(format!(
            "replaced {replaced} of {} field elements",
            targets.len()
        )));
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| TemplateError::ParseError(format!("rewritten markup is not UTF-8: {e}")))
}

fn is_tspan(name: &[u8]) -> bool {
    name == b"tspan"
}
