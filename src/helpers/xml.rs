//! XML reading utilities for the parts of an Office Open XML package.
//! Wraps the quick-xml pull parser and collects element text with entity handling.

use crate::error::SheetExportError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;
use std::io::BufRead;
use std::str::FromStr;
use thiserror::Error;

/// Errors specific to XML parsing operations
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Unknown entity '&{0};'")]
    UnknownEntity(String),

    #[error("Invalid value '{value}' for attribute '{name}'")]
    InvalidAttributeValue { name: String, value: String },
}

/// Pull reader over one XML part, reusing a single event buffer.
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    pub(crate) fn new(source: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(source);
        let config = reader.config_mut();
        config.check_end_names = false;
        // `<c r="A1"/>` arrives as Start + End so cell handling has one path
        config.expand_empty_elements = true;
        config.trim_text(false);
        XmlReader {
            reader,
            buffer: Vec::with_capacity(1024),
        }
    }

    /// Reads the next event, None at end of document.
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, SheetExportError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer)? {
            Event::Eof => Ok(None),
            event => Ok(Some(event)),
        }
    }

    /// Collects the text of the current element up to the closing `end` tag.
    ///
    /// When `inside_text` is false only the content of nested `<t>` elements is
    /// kept, skipping phonetic runs (`<rPh>`) as rich strings require.
    pub(crate) fn read_text(&mut self, end: QName, inside_text: bool) -> Result<String, SheetExportError> {
        let mut in_phonetic = false;
        let mut in_text = inside_text;
        let mut text = String::new();
        while let Some(event) = self.next()? {
            match event {
                Event::End(event) if event.name() == end => break,
                Event::Start(event) if event.name() == QName(b"rPh") => in_phonetic = true,
                Event::End(event) if event.name() == QName(b"rPh") => in_phonetic = false,
                Event::Start(event) if !in_phonetic && event.name() == QName(b"t") => in_text = true,
                Event::End(event) if event.name() == QName(b"t") => in_text = inside_text,
                Event::Text(event) if in_text => text.push_str(&event.xml_content()?),
                Event::CData(event) if in_text => text.push_str(&event.xml_content()?),
                Event::GeneralRef(event) if in_text => push_reference(&mut text, &event)?,
                _ => (),
            }
        }
        Ok(text)
    }
}

/// Appends the character an entity or character reference stands for.
fn push_reference(text: &mut String, reference: &BytesRef) -> Result<(), SheetExportError> {
    let raw = reference.xml_content()?;
    if let Some(number) = raw.strip_prefix('#') {
        let code = match number.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16)?,
            None => number.parse::<u32>()?,
        };
        if let Some(character) = char::from_u32(code) {
            text.push(character);
        }
    } else if let Some(entity) = resolve_xml_entity(&raw) {
        text.push_str(entity);
    } else {
        Err(XmlError::UnknownEntity(raw.to_string()))?;
    }
    Ok(())
}

/// Returns the unescaped value of an attribute, matched by its local name.
pub(crate) fn attribute(element: &BytesStart, name: &str) -> Result<Option<String>, SheetExportError> {
    for attribute in element.attributes() {
        let attribute = attribute?;
        if attribute.key.local_name().as_ref() == name.as_bytes() {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Parses an attribute value, failing when it is present but malformed.
pub(crate) fn parse_attribute<T: FromStr>(element: &BytesStart, name: &str) -> Result<Option<T>, SheetExportError> {
    match attribute(element, name)? {
        Some(value) => match value.parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(XmlError::InvalidAttributeValue {
                name: name.to_owned(),
                value,
            }
            .into()),
        },
        None => Ok(None),
    }
}

#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(event) = $reader.next()? {
            match event {
                $($arms)*
                _ => (),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rich_text_skips_phonetic_runs() {
        let xml = r#"<si><r><t>Tok</t></r><r><t xml:space="preserve">yo &amp; co&#33;</t></r><rPh><t>ignored</t></rPh></si>"#;
        let mut reader = XmlReader::new(xml.as_bytes());
        let _ = reader.next().unwrap();
        assert_eq!(reader.read_text(QName(b"si"), false).unwrap(), "Tokyo & co!");
    }

    #[test]
    fn attributes_by_local_name() {
        let xml = r#"<sheet name="A &amp; B" sheetId="7" r:id="rId1" bad="x"/>"#;
        let mut reader = XmlReader::new(xml.as_bytes());
        match reader.next().unwrap() {
            Some(Event::Start(element)) => {
                assert_eq!(attribute(&element, "name").unwrap().as_deref(), Some("A & B"));
                assert_eq!(attribute(&element, "id").unwrap().as_deref(), Some("rId1"));
                assert_eq!(parse_attribute::<u32>(&element, "sheetId").unwrap(), Some(7));
                assert_eq!(parse_attribute::<u32>(&element, "missing").unwrap(), None);
                assert!(parse_attribute::<u32>(&element, "bad").is_err());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
