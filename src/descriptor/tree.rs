//! Descriptor tree types and child lookup helpers.

use std::path::Path;

use super::error::{Error, Result};

/// A single `name="value"` pair on an element.
///
/// The value is stored unescaped and re-escaped on serialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name as written in the source (prefix included)
    pub name: String,
    /// Unescaped attribute value
    pub value: String,
}

/// Content node inside an element or around the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Nested element
    Element(Element),
    /// Character data, kept in its escaped source form
    Text(String),
    /// `<![CDATA[...]]>` section content
    CData(String),
    /// `<!--...-->` comment content
    Comment(String),
    /// `<?target data?>` processing instruction content
    ProcessingInstruction(String),
    /// `<!DOCTYPE ...>` content
    DocType(String),
}

/// XML element with ordered attributes and children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
    self_closing: bool,
}

impl Element {
    /// Creates an empty, self-closing element.
    #[cfg(test)]
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    pub(super) fn from_parts(name: String, attributes: Vec<Attribute>, self_closing: bool) -> Self {
        Self {
            name,
            attributes,
            children: Vec::new(),
            self_closing,
        }
    }

    /// Builder-style attribute setter.
    #[cfg(test)]
    pub(crate) fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder-style child appender.
    #[cfg(test)]
    pub(crate) fn with_child(mut self, child: Element) -> Self {
        self.push_child(Node::Element(child));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Whether the element serializes as `<name/>` when it has no children.
    pub fn is_self_closing(&self) -> bool {
        self.self_closing
    }

    /// Returns the value of the named attribute, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Sets an attribute, keeping its position if it already exists.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value.to_string(),
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Replaces every occurrence of `token` inside the named attribute.
    ///
    /// Returns the number of replaced occurrences, or `None` when the
    /// attribute does not exist. Absent tokens leave the value unchanged.
    pub fn replace_in_attribute(&mut self, name: &str, token: &str, replacement: &str) -> Option<usize> {
        let attr = self.attributes.iter_mut().find(|attr| attr.name == name)?;
        let count = attr.value.matches(token).count();
        if count > 0 {
            attr.value = attr.value.replace(token, replacement);
        }
        Some(count)
    }

    pub fn push_child(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Iterates over the immediate child elements, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Mutable counterpart of [`Element::child_elements`].
    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Finds the first immediate child whose `attr` equals `value`.
    ///
    /// Children without the attribute never match. Only direct children are
    /// scanned.
    pub fn find_child(&self, attr: &str, value: &str) -> Option<&Element> {
        self.child_elements()
            .find(|child| child.attribute(attr) == Some(value))
    }

    /// Mutable counterpart of [`Element::find_child`].
    pub fn find_child_mut(&mut self, attr: &str, value: &str) -> Option<&mut Element> {
        self.child_elements_mut()
            .find(|child| child.attribute(attr) == Some(value))
    }

    /// Finds the first immediate child element with the given name.
    pub fn find_child_named_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.child_elements_mut().find(|child| child.name == name)
    }

    /// Follows a chain of `attr` values from this element downwards.
    ///
    /// On failure returns the first value in `path` that had no match.
    pub fn descend_mut<'p>(&mut self, attr: &str, path: &[&'p str]) -> std::result::Result<&mut Element, &'p str> {
        let mut current = self;
        for id in path {
            current = current.find_child_mut(attr, id).ok_or(*id)?;
        }
        Ok(current)
    }
}

/// Parsed installer descriptor.
///
/// Holds the root element together with the comments, processing
/// instructions and doctype found before and after it. The XML declaration
/// is only recorded; serialization never emits one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub(super) prolog: Vec<Node>,
    pub(super) root: Element,
    pub(super) epilog: Vec<Node>,
    pub(super) had_declaration: bool,
}

impl Document {
    /// Wraps an element as a document with no prolog.
    #[cfg(test)]
    pub(crate) fn new(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
            had_declaration: false,
        }
    }

    /// Reads and parses a descriptor file.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let text = std::str::from_utf8(&bytes).map_err(Error::Utf8)?;
        Self::parse(text)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Nodes preceding the root element.
    pub fn prolog(&self) -> &[Node] {
        &self.prolog
    }

    /// Nodes following the root element.
    pub fn epilog(&self) -> &[Node] {
        &self.epilog
    }

    /// Whether the source carried an `<?xml ...?>` declaration.
    pub fn had_declaration(&self) -> bool {
        self.had_declaration
    }
}
