//! Event-driven construction of the descriptor tree.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::error::{Error, Result};
use super::tree::{Attribute, Document, Element, Node};

impl Document {
    /// Parses descriptor text into an owned tree.
    ///
    /// Rejects mismatched or unclosed tags, duplicate attributes, unknown
    /// entities in attribute values, text outside the root element and
    /// documents with zero or several root elements.
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        let mut builder = TreeBuilder::default();

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader.read_event().map_err(|source| Error::Xml {
                position: reader.error_position() as u64,
                source,
            })?;

            match event {
                Event::Decl(_) => builder.had_declaration = true,
                Event::Start(start) => {
                    let element = element_from_start(&start, false, position)?;
                    builder.open.push(element);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&start, true, position)?;
                    builder.attach(Node::Element(element), position)?;
                }
                Event::End(_) => {
                    let element = builder.open.pop().ok_or_else(|| Error::Malformed {
                        position,
                        reason: "closing tag without matching opening tag".to_string(),
                    })?;
                    builder.attach(Node::Element(element), position)?;
                }
                Event::Text(text) => {
                    text.unescape()
                        .map_err(|source| Error::Xml { position, source })?;
                    let raw = std::str::from_utf8(&text)?;
                    builder.attach(Node::Text(raw.to_string()), position)?;
                }
                Event::CData(data) => {
                    let raw = std::str::from_utf8(&data)?;
                    builder.attach(Node::CData(raw.to_string()), position)?;
                }
                Event::Comment(comment) => {
                    let raw = std::str::from_utf8(&comment)?;
                    builder.attach(Node::Comment(raw.to_string()), position)?;
                }
                Event::PI(pi) => {
                    let raw = std::str::from_utf8(&pi)?;
                    builder.attach(Node::ProcessingInstruction(raw.to_string()), position)?;
                }
                Event::DocType(doctype) => {
                    let raw = std::str::from_utf8(&doctype)?;
                    builder.attach(Node::DocType(raw.to_string()), position)?;
                }
                Event::Eof => break,
            }
        }

        builder.finish(reader.buffer_position() as u64)
    }
}

/// Accumulates nodes while the reader walks the document.
#[derive(Default)]
struct TreeBuilder {
    open: Vec<Element>,
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
    had_declaration: bool,
}

impl TreeBuilder {
    fn attach(&mut self, node: Node, position: u64) -> Result<()> {
        if let Some(parent) = self.open.last_mut() {
            parent.push_child(node);
            return Ok(());
        }

        match node {
            Node::Element(element) => {
                if self.root.is_some() {
                    return Err(Error::Malformed {
                        position,
                        reason: format!("second root element <{}>", element.name()),
                    });
                }
                self.root = Some(element);
            }
            Node::Text(text) if text.trim().is_empty() => {
                // Leading whitespace belonged to the declaration line.
                if self.root.is_some() {
                    self.epilog.push(Node::Text(text));
                } else if !self.prolog.is_empty() {
                    self.prolog.push(Node::Text(text));
                }
            }
            Node::Text(_) | Node::CData(_) => {
                return Err(Error::Malformed {
                    position,
                    reason: "character data outside of the root element".to_string(),
                });
            }
            other => {
                if self.root.is_some() {
                    self.epilog.push(other);
                } else {
                    self.prolog.push(other);
                }
            }
        }
        Ok(())
    }

    fn finish(self, position: u64) -> Result<Document> {
        if let Some(unclosed) = self.open.last() {
            return Err(Error::Malformed {
                position,
                reason: format!("unclosed element <{}>", unclosed.name()),
            });
        }
        let root = self.root.ok_or_else(|| Error::Malformed {
            position,
            reason: "no root element".to_string(),
        })?;
        Ok(Document {
            prolog: self.prolog,
            root,
            epilog: self.epilog,
            had_declaration: self.had_declaration,
        })
    }
}

fn element_from_start(start: &BytesStart<'_>, self_closing: bool, position: u64) -> Result<Element> {
    let name = std::str::from_utf8(start.name().as_ref())?.to_string();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|source| Error::Attribute { position, source })?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr
            .unescape_value()
            .map_err(|source| Error::Xml { position, source })?
            .into_owned();
        attributes.push(Attribute { name: key, value });
    }
    Ok(Element::from_parts(name, attributes, self_closing))
}
