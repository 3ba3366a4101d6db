//! Streaming XML event model.
//!
//! Every higher layer works on owned [`XmlEvent`] values produced by an
//! [`EventReader`] and turned back into text by [`serialize`]. Events carry
//! resolved namespaces so that qualified names compare by namespace URI
//! and local part regardless of the prefix a producer chose.
//!
//! # Examples
//!
//! ```rust
//! use runweave::ooxml::event::{serialize, EventReader};
//!
//! let xml = r#"<w:p xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:r/></w:p>"#;
//! let mut reader = EventReader::from_str(xml);
//! let mut events = Vec::new();
//! while let Some(event) = reader.next_event()? {
//!     events.push(event);
//! }
//! assert_eq!(serialize(&events), xml);
//! # Ok::<(), runweave::ooxml::OoxmlError>(())
//! ```

pub mod names;
mod reader;
mod writer;

pub use reader::EventReader;
pub use writer::{XmlWriter, serialize};

use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};

use names::{LOCAL_PRESERVE, LOCAL_SPACE, XML};

/// A namespace-qualified name.
///
/// Equality and hashing consider the namespace URI and the local part only.
/// The prefix is kept for serialization.
#[derive(Debug, Clone, Default)]
pub struct QName {
    pub prefix: String,
    pub namespace: String,
    pub local: String,
}

impl QName {
    #[inline]
    pub fn new(namespace: impl Into<String>, local: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// A name without namespace and prefix.
    #[inline]
    pub fn unqualified(local: impl Into<String>) -> Self {
        Self::new("", local, "")
    }

    /// A name sharing this name's prefix and namespace.
    #[inline]
    pub fn sibling(&self, local: impl Into<String>) -> Self {
        Self::new(self.namespace.clone(), local, self.prefix.clone())
    }

    /// The name as written in markup, `prefix:local` or `local`.
    pub fn qualified(&self) -> String {
        if self.prefix.is_empty() {
            self.local.clone()
        } else {
            format!("{}:{}", self.prefix, self.local)
        }
    }

    #[inline]
    pub fn is_in(&self, namespace: &str) -> bool {
        self.namespace == namespace
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.local == other.local && self.namespace == other.namespace
    }
}

impl Eq for QName {}

impl Hash for QName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.local.hash(state);
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            f.write_str(&self.local)
        } else {
            write!(f, "{}:{}", self.prefix, self.local)
        }
    }
}

/// An attribute of a start element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    #[inline]
    pub fn new(name: QName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// A namespace declaration; an empty prefix declares the default namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDeclaration {
    pub prefix: String,
    pub uri: String,
}

pub type Attributes = SmallVec<[Attribute; 4]>;

/// An element start tag.
#[derive(Debug, Clone)]
pub struct StartElement {
    pub name: QName,
    pub attributes: Attributes,
    pub namespaces: SmallVec<[NamespaceDeclaration; 2]>,
}

impl StartElement {
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: SmallVec::new(),
            namespaces: SmallVec::new(),
        }
    }

    pub fn with_attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = Attribute>) -> Self {
        self.attributes = attributes.into_iter().collect();
        self
    }

    /// Look up an attribute value by qualified name.
    pub fn attribute(&self, name: &QName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| &a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Look up an attribute value by local name, ignoring namespaces.
    pub fn attribute_by_local(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.local == local)
            .map(|a| a.value.as_str())
    }

    /// Replace an attribute value or append the attribute.
    pub fn set_attribute(&mut self, name: QName, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attribute) => attribute.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    pub fn remove_attribute(&mut self, name: &QName) -> Option<Attribute> {
        let index = self.attributes.iter().position(|a| &a.name == name)?;
        Some(self.attributes.remove(index))
    }

    #[inline]
    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Whether `xml:space="preserve"` is set.
    pub fn preserves_space(&self) -> bool {
        self.attributes
            .iter()
            .any(|a| a.name.local == LOCAL_SPACE && a.name.namespace == XML && a.value == LOCAL_PRESERVE)
    }

    /// The matching end tag.
    #[inline]
    pub fn end(&self) -> EndElement {
        EndElement {
            name: self.name.clone(),
        }
    }
}

// Attribute order and namespace declarations do not affect identity
impl PartialEq for StartElement {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.attributes.len() == other.attributes.len()
            && self
                .attributes
                .iter()
                .all(|a| other.attribute(&a.name) == Some(a.value.as_str()))
    }
}

impl Eq for StartElement {}

/// An element end tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndElement {
    pub name: QName,
}

impl EndElement {
    #[inline]
    pub fn new(name: QName) -> Self {
        Self { name }
    }
}

/// The XML declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

/// A single XML event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    Declaration(Declaration),
    StartElement(StartElement),
    EndElement(EndElement),
    /// Character data, with adjacent text, references and CDATA coalesced
    Characters(String),
    Comment(String),
    /// Raw processing instruction content (target and data)
    ProcessingInstruction(String),
}

impl XmlEvent {
    #[inline]
    pub fn start(name: QName) -> Self {
        XmlEvent::StartElement(StartElement::new(name))
    }

    #[inline]
    pub fn end(name: QName) -> Self {
        XmlEvent::EndElement(EndElement::new(name))
    }

    #[inline]
    pub fn characters(text: impl Into<String>) -> Self {
        XmlEvent::Characters(text.into())
    }

    #[inline]
    pub fn as_start_element(&self) -> Option<&StartElement> {
        match self {
            XmlEvent::StartElement(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_start_element_mut(&mut self) -> Option<&mut StartElement> {
        match self {
            XmlEvent::StartElement(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_end_element(&self) -> Option<&EndElement> {
        match self {
            XmlEvent::EndElement(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_characters(&self) -> Option<&str> {
        match self {
            XmlEvent::Characters(text) => Some(text),
            _ => None,
        }
    }

    #[inline]
    pub fn is_start_element(&self) -> bool {
        matches!(self, XmlEvent::StartElement(_))
    }

    #[inline]
    pub fn is_end_element(&self) -> bool {
        matches!(self, XmlEvent::EndElement(_))
    }

    #[inline]
    pub fn is_characters(&self) -> bool {
        matches!(self, XmlEvent::Characters(_))
    }

    /// Name of a start or end element.
    pub fn name(&self) -> Option<&QName> {
        match self {
            XmlEvent::StartElement(e) => Some(&e.name),
            XmlEvent::EndElement(e) => Some(&e.name),
            _ => None,
        }
    }

    /// Local name of a start or end element.
    #[inline]
    pub fn local_name(&self) -> Option<&str> {
        self.name().map(|n| n.local.as_str())
    }

    /// Whether this is a start element with the given local name.
    #[inline]
    pub fn is_start_named(&self, local: &str) -> bool {
        matches!(self, XmlEvent::StartElement(e) if e.name.local == local)
    }

    /// Whether this is an end element with the given local name.
    #[inline]
    pub fn is_end_named(&self, local: &str) -> bool {
        matches!(self, XmlEvent::EndElement(e) if e.name.local == local)
    }

    /// Whether this is the end element matching `start`.
    #[inline]
    pub fn is_end_of(&self, start: &StartElement) -> bool {
        matches!(self, XmlEvent::EndElement(e) if e.name == start.name)
    }

    /// Character data consisting of whitespace only.
    pub fn is_whitespace(&self) -> bool {
        matches!(self, XmlEvent::Characters(text) if text.chars().all(char::is_whitespace))
    }
}

impl From<StartElement> for XmlEvent {
    fn from(e: StartElement) -> Self {
        XmlEvent::StartElement(e)
    }
}

impl From<EndElement> for XmlEvent {
    fn from(e: EndElement) -> Self {
        XmlEvent::EndElement(e)
    }
}

/// Whether every event is whitespace character data.
pub fn all_whitespace<'a>(events: impl IntoIterator<Item = &'a XmlEvent>) -> bool {
    events.into_iter().all(XmlEvent::is_whitespace)
}

/// Parse an OOXML boolean attribute value.
pub fn parse_boolean(value: &str) -> Option<bool> {
    match value {
        "true" | "1" | "on" => Some(true),
        "false" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Collect the events of `start` through its matching end, inclusive.
///
/// `start` must be the event most recently taken from `reader`.
pub fn gather_element(start: StartElement, reader: &mut EventReader<'_>) -> crate::ooxml::Result<Vec<XmlEvent>> {
    let name = start.name.clone();
    let mut events = vec![XmlEvent::StartElement(start)];
    let mut depth = 0usize;
    while let Some(event) = reader.next_event()? {
        match &event {
            XmlEvent::StartElement(e) if e.name == name => depth += 1,
            XmlEvent::EndElement(e) if e.name == name => {
                if depth == 0 {
                    events.push(event);
                    return Ok(events);
                }
                depth -= 1;
            },
            _ => {},
        }
        events.push(event);
    }
    Err(crate::ooxml::OoxmlError::structure(format!(
        "Unterminated element {}",
        name
    )))
}
