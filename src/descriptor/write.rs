//! Serialization of the descriptor tree back to XML text.

use std::borrow::Cow;

use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute as XmlAttribute;
use quick_xml::events::{BytesCData, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::name::QName;

use super::error::{Error, Result};
use super::tree::{Document, Element, Node};

impl Document {
    /// Serializes the document without an XML declaration.
    ///
    /// Unchanged text, comments and attribute order come out as they were
    /// read; attribute values are re-escaped.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }
        String::from_utf8(writer.into_inner()).map_err(|e| Error::Serialize(e.to_string()))
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Serialize(e.to_string()))
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<()> {
    match node {
        Node::Element(element) => write_element(writer, element),
        Node::Text(raw) => emit(writer, Event::Text(BytesText::from_escaped(raw.as_str()))),
        Node::CData(data) => emit(writer, Event::CData(BytesCData::new(data.as_str()))),
        Node::Comment(raw) => emit(writer, Event::Comment(BytesText::from_escaped(raw.as_str()))),
        Node::ProcessingInstruction(raw) => emit(writer, Event::PI(BytesPI::new(raw.as_str()))),
        Node::DocType(raw) => emit(writer, Event::DocType(BytesText::from_escaped(raw.as_str()))),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name());
    for attr in element.attributes() {
        start.push_attribute(XmlAttribute {
            key: QName(attr.name.as_bytes()),
            value: Cow::Owned(escape_attribute_value(&attr.value).into_bytes()),
        });
    }

    if element.children().is_empty() && element.is_self_closing() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    for child in element.children() {
        write_node(writer, child)?;
    }
    emit(writer, Event::End(BytesEnd::new(element.name())))
}

/// Escapes markup characters and the whitespace that attribute value
/// normalization would otherwise turn into spaces.
fn escape_attribute_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in escape(value).chars() {
        match c {
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            c => escaped.push(c),
        }
    }
    escaped
}
