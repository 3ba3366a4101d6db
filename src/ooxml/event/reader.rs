/// Forward-only event cursor over XML markup or a recorded event list.
use super::names::XML;
use super::{Attribute, Declaration, NamespaceDeclaration, QName, StartElement, XmlEvent};
use crate::common::xml::{resolve_reference, unescape_xml};
use crate::ooxml::error::{OoxmlError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesDecl, BytesStart, Event};
use smallvec::SmallVec;
use std::collections::VecDeque;

/// A pull cursor over [`XmlEvent`]s.
///
/// Adjacent text, entity references and CDATA sections are delivered as a
/// single [`XmlEvent::Characters`]; empty elements are delivered as a start
/// immediately followed by its end. Events may be pushed back to be read
/// again.
pub struct EventReader<'a> {
    source: Source<'a>,
    lookahead: VecDeque<XmlEvent>,
}

enum Source<'a> {
    Markup(Box<MarkupSource<'a>>),
    Events(std::vec::IntoIter<XmlEvent>),
}

impl<'a> EventReader<'a> {
    /// Read events from XML text.
    pub fn from_str(xml: &'a str) -> Self {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().expand_empty_elements = true;
        reader.config_mut().trim_text(false);

        Self {
            source: Source::Markup(Box::new(MarkupSource {
                reader,
                scopes: Vec::new(),
                queue: VecDeque::new(),
                finished: false,
            })),
            lookahead: VecDeque::new(),
        }
    }

    /// Replay previously recorded events.
    pub fn from_events(events: impl IntoIterator<Item = XmlEvent>) -> EventReader<'static> {
        EventReader {
            source: Source::Events(events.into_iter().collect::<Vec<_>>().into_iter()),
            lookahead: VecDeque::new(),
        }
    }

    /// Take the next event, or `None` at the end of the stream.
    pub fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        if let Some(event) = self.lookahead.pop_front() {
            return Ok(Some(event));
        }
        self.pull()
    }

    /// Look at the next event without consuming it.
    pub fn peek(&mut self) -> Result<Option<&XmlEvent>> {
        if self.lookahead.is_empty()
            && let Some(event) = self.pull()?
        {
            self.lookahead.push_back(event);
        }
        Ok(self.lookahead.front())
    }

    pub fn has_next(&mut self) -> Result<bool> {
        Ok(self.peek()?.is_some())
    }

    /// Return an event to the front of the stream.
    #[inline]
    pub fn push_back(&mut self, event: XmlEvent) {
        self.lookahead.push_front(event);
    }

    /// Skip whitespace, comments and processing instructions up to the
    /// next start or end tag.
    ///
    /// Non-whitespace character data is an error.
    pub fn next_tag(&mut self) -> Result<Option<XmlEvent>> {
        while let Some(event) = self.next_event()? {
            match &event {
                XmlEvent::StartElement(_) | XmlEvent::EndElement(_) => return Ok(Some(event)),
                XmlEvent::Characters(_) if !event.is_whitespace() => {
                    return Err(OoxmlError::structure("Expected a start or end tag, found text"));
                },
                _ => {},
            }
        }
        Ok(None)
    }

    fn pull(&mut self) -> Result<Option<XmlEvent>> {
        match &mut self.source {
            Source::Events(events) => Ok(events.next()),
            Source::Markup(markup) => markup.read(),
        }
    }
}

struct MarkupSource<'a> {
    reader: Reader<&'a [u8]>,
    /// Namespace declarations of the currently open elements
    scopes: Vec<SmallVec<[NamespaceDeclaration; 2]>>,
    queue: VecDeque<XmlEvent>,
    finished: bool,
}

impl<'a> MarkupSource<'a> {
    fn read(&mut self) -> Result<Option<XmlEvent>> {
        if let Some(event) = self.queue.pop_front() {
            return Ok(Some(event));
        }
        if self.finished {
            return Ok(None);
        }

        let mut text: Option<String> = None;
        loop {
            let event = match self.reader.read_event()? {
                Event::Text(t) => {
                    let raw = std::str::from_utf8(&t)?;
                    text.get_or_insert_with(String::new).push_str(&unescape_xml(raw));
                    continue;
                },
                Event::CData(c) => {
                    let raw = std::str::from_utf8(&c)?;
                    text.get_or_insert_with(String::new).push_str(raw);
                    continue;
                },
                Event::GeneralRef(r) => {
                    let name = std::str::from_utf8(&r)?;
                    let buffer = text.get_or_insert_with(String::new);
                    match resolve_reference(name) {
                        Some(c) => buffer.push(c),
                        None => {
                            buffer.push('&');
                            buffer.push_str(name);
                            buffer.push(';');
                        },
                    }
                    continue;
                },
                Event::Start(e) => XmlEvent::StartElement(self.start_element(&e)?),
                Event::Empty(e) => {
                    let start = self.start_element(&e)?;
                    self.scopes.pop();
                    self.queue.push_back(XmlEvent::EndElement(start.end()));
                    XmlEvent::StartElement(start)
                },
                Event::End(e) => {
                    let name = e.name();
                    let raw = std::str::from_utf8(name.as_ref())?;
                    let name = self.resolve(raw, true);
                    self.scopes.pop();
                    XmlEvent::end(name)
                },
                Event::Decl(d) => XmlEvent::Declaration(declaration(&d)?),
                Event::PI(p) => XmlEvent::ProcessingInstruction(std::str::from_utf8(&p)?.to_string()),
                Event::Comment(c) => XmlEvent::Comment(std::str::from_utf8(&c)?.to_string()),
                Event::Eof => {
                    self.finished = true;
                    return Ok(text.map(XmlEvent::Characters));
                },
                #[allow(unreachable_patterns)]
                _ => continue,
            };

            return Ok(Some(match text {
                Some(text) => {
                    self.queue.push_back(event);
                    XmlEvent::Characters(text)
                },
                None => event,
            }));
        }
    }

    fn start_element(&mut self, e: &BytesStart<'_>) -> Result<StartElement> {
        let mut namespaces = SmallVec::new();
        let mut raw_attributes: SmallVec<[(String, String); 4]> = SmallVec::new();

        for attr in e.attributes() {
            let attr = attr.map_err(|err| OoxmlError::Xml(err.to_string()))?;
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let value = attr
                .decode_and_unescape_value(self.reader.decoder())
                .map_err(|err| OoxmlError::Xml(err.to_string()))?
                .into_owned();

            if key == "xmlns" {
                namespaces.push(NamespaceDeclaration {
                    prefix: String::new(),
                    uri: value,
                });
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                namespaces.push(NamespaceDeclaration {
                    prefix: prefix.to_string(),
                    uri: value,
                });
            } else {
                raw_attributes.push((key.to_string(), value));
            }
        }

        self.scopes.push(namespaces.clone());

        let name = self.resolve(std::str::from_utf8(e.name().as_ref())?, true);
        let attributes = raw_attributes
            .into_iter()
            .map(|(key, value)| Attribute {
                name: self.resolve(&key, false),
                value,
            })
            .collect();

        Ok(StartElement {
            name,
            attributes,
            namespaces,
        })
    }

    /// Unprefixed attributes are in no namespace; unprefixed elements take
    /// the default namespace.
    fn resolve(&self, raw: &str, element: bool) -> QName {
        match raw.split_once(':') {
            Some((prefix, local)) => QName::new(self.lookup(prefix), local, prefix),
            None if element => QName::new(self.lookup(""), raw, ""),
            None => QName::unqualified(raw),
        }
    }

    fn lookup(&self, prefix: &str) -> String {
        if prefix == "xml" {
            return XML.to_string();
        }
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter())
            .find(|d| d.prefix == prefix)
            .map(|d| d.uri.clone())
            .unwrap_or_default()
    }
}

fn declaration(d: &BytesDecl<'_>) -> Result<Declaration> {
    let version = d.version().map_err(|e| OoxmlError::Xml(e.to_string()))?;
    let encoding = d
        .encoding()
        .transpose()
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    let standalone = d
        .standalone()
        .transpose()
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;

    Ok(Declaration {
        version: std::str::from_utf8(&version)?.to_string(),
        encoding: encoding
            .map(|v| std::str::from_utf8(&v).map(str::to_string))
            .transpose()?,
        standalone: standalone
            .map(|v| std::str::from_utf8(&v).map(str::to_string))
            .transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::super::names::{WORDPROCESSING_ML, wpml};
    use super::*;

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn collect(xml: &str) -> Vec<XmlEvent> {
        let mut reader = EventReader::from_str(xml);
        let mut events = Vec::new();
        while let Some(event) = reader.next_event().unwrap() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_namespace_resolution() {
        let events = collect(&format!(r#"<w:p {W}><w:r w:rsidR="00A1" plain="x"/></w:p>"#));
        let p = events[0].as_start_element().unwrap();
        assert_eq!(p.name, wpml("p"));
        assert_eq!(p.namespaces[0].uri, WORDPROCESSING_ML);

        let r = events[1].as_start_element().unwrap();
        assert_eq!(r.attribute(&wpml("rsidR")), Some("00A1"));
        assert_eq!(r.attribute(&QName::unqualified("plain")), Some("x"));
        assert!(events[2].is_end_named("r"));
        assert_eq!(events[3].name(), Some(&wpml("p")));
    }

    #[test]
    fn test_end_elements_resolve_in_scope() {
        let events = collect(&format!(r#"<w:p {W}><x:y xmlns:x="urn:x"><w:t>a</w:t></x:y></w:p>"#));
        assert_eq!(events.len(), 7);
        assert_eq!(events[4].as_end_element().map(|e| &e.name), Some(&wpml("t")));
        assert_eq!(events[5].as_end_element().map(|e| &e.name), Some(&QName::new("urn:x", "y", "x")));
        assert_eq!(events[6].as_end_element().map(|e| &e.name), Some(&wpml("p")));
    }

    #[test]
    fn test_default_namespace_applies_to_elements() {
        let events = collect(r#"<si xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><t>a</t></si>"#);
        assert_eq!(
            events[1].name().map(|n| n.namespace.as_str()),
            Some(super::super::names::SPREADSHEET_ML)
        );
    }

    #[test]
    fn test_text_and_references_are_coalesced() {
        let events = collect(&format!("<w:t {W}>a &amp; b&#x41;<![CDATA[<c>]]></w:t>"));
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].as_characters(), Some("a & bA<c>"));
    }

    #[test]
    fn test_xml_space_attribute() {
        let events = collect(&format!(r#"<w:t {W} xml:space="preserve"> x </w:t>"#));
        assert!(events[0].as_start_element().unwrap().preserves_space());
        assert_eq!(events[1].as_characters(), Some(" x "));
    }

    #[test]
    fn test_peek_and_push_back() {
        let xml = format!("<w:p {W}><w:r/></w:p>");
        let mut reader = EventReader::from_str(&xml);
        assert!(reader.peek().unwrap().unwrap().is_start_named("p"));
        let p = reader.next_event().unwrap().unwrap();
        let r = reader.next_event().unwrap().unwrap();
        reader.push_back(r.clone());
        assert_eq!(reader.next_event().unwrap(), Some(r));
        assert!(p.is_start_named("p"));
        assert!(reader.has_next().unwrap());
    }

    #[test]
    fn test_next_tag_skips_whitespace_and_rejects_text() {
        let xml = format!("<w:p {W}>\n  <w:r/>text</w:p>");
        let mut reader = EventReader::from_str(&xml);
        reader.next_event().unwrap();
        assert!(reader.next_tag().unwrap().unwrap().is_start_named("r"));
        assert!(reader.next_tag().unwrap().unwrap().is_end_named("r"));
        assert!(reader.next_tag().is_err());
    }

    #[test]
    fn test_from_events() {
        let events = vec![XmlEvent::start(wpml("r")), XmlEvent::end(wpml("r"))];
        let mut reader = EventReader::from_events(events.clone());
        assert_eq!(reader.next_event().unwrap(), Some(events[0].clone()));
        assert_eq!(reader.next_event().unwrap(), Some(events[1].clone()));
        assert_eq!(reader.next_event().unwrap(), None);
    }
}
