//! Parsing and writing of XHTML note bodies.
//!
//! Notes are stored on SBML entities as an XHTML `<body>` whose
//! paragraphs each carry one `KEY: value` pair. Paragraphs with nested
//! markup after the key keep their subtree as an opaque value and are
//! written back untouched.

use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

use crate::document::{AnnotationBlock, NoteValue};

const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Errors raised while reading or writing note bodies.
#[derive(Debug, Error)]
pub enum NotesError {
    /// The note body is not well-formed XML.
    #[error("malformed note body: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An escape sequence in a note value is invalid.
    #[error("invalid escape sequence in note body: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
}

/// Parses an XHTML note body into an [`AnnotationBlock`].
///
/// Accepts a `<body>` element, a full `<notes><body>` wrapper, or bare
/// `<p>` paragraphs. Paragraphs without a `KEY: value` shape are skipped.
pub fn parse_note_body(xml: &str) -> Result<AnnotationBlock, NotesError> {
    let mut block = AnnotationBlock::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"p" => {
                let span = reader.read_to_end(e.name())?;
                let raw = &xml[span.start as usize..span.end as usize];
                if let Some((key, value)) = parse_paragraph(raw)? {
                    block.set(key, value);
                }
            }
            Event::Eof => break,
            // <notes> and <body> wrappers, whitespace, comments
            _ => {}
        }
    }
    Ok(block)
}

/// Splits one paragraph's raw inner XML into a key/value pair.
fn parse_paragraph(raw: &str) -> Result<Option<(String, NoteValue)>, NotesError> {
    let Some(colon) = raw.find(':') else {
        log::debug!("skipping note paragraph without key: {raw}");
        return Ok(None);
    };
    // keys never contain markup; a tag before the colon means this is not
    // a KEY: value paragraph
    let key_part = &raw[..colon];
    if key_part.contains('<') {
        log::debug!("skipping note paragraph with non-text key: {raw}");
        return Ok(None);
    }
    let key = unescape(key_part)?.trim().to_string();
    let value_part = raw[colon + 1..].trim();
    let value = if value_part.contains('<') {
        NoteValue::Opaque(value_part.to_string())
    } else {
        NoteValue::Text(unescape(value_part)?.into_owned())
    };
    Ok(Some((key, value)))
}

/// Writes an [`AnnotationBlock`] back to an XHTML note body.
pub fn write_note_body(block: &AnnotationBlock) -> String {
    let mut body = format!("<body xmlns=\"{XHTML_NAMESPACE}\">");
    for (key, value) in block.iter() {
        let key = escape(key);
        match value {
            NoteValue::Text(text) if text.is_empty() => {
                body.push_str(&format!("<p>{key}: </p>"));
            }
            NoteValue::Text(text) => {
                body.push_str(&format!("<p>{key}: {}</p>", escape(text.as_str())));
            }
            NoteValue::Opaque(raw) => {
                body.push_str(&format!("<p>{key}: {raw}</p>"));
            }
        }
    }
    body.push_str("</body>");
    body
}
