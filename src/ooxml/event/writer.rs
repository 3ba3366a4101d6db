/// Event serialization.
use super::{StartElement, XmlEvent};
use crate::common::xml::{escape_attribute, escape_text};

/// Writes events as XML text.
///
/// A start tag directly followed by its end tag is written as an empty
/// element.
#[derive(Debug, Default)]
pub struct XmlWriter {
    out: String,
    pending: Option<StartElement>,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, event: &XmlEvent) {
        if let XmlEvent::EndElement(end) = event
            && let Some(start) = self.pending.take()
        {
            if start.name == end.name {
                self.write_start_tag(&start, true);
                return;
            }
            self.write_start_tag(&start, false);
        } else {
            self.flush_pending();
        }

        match event {
            XmlEvent::Declaration(d) => {
                self.out.push_str("<?xml version=\"");
                self.out.push_str(&escape_attribute(&d.version));
                self.out.push('"');
                if let Some(encoding) = &d.encoding {
                    self.out.push_str(" encoding=\"");
                    self.out.push_str(&escape_attribute(encoding));
                    self.out.push('"');
                }
                if let Some(standalone) = &d.standalone {
                    self.out.push_str(" standalone=\"");
                    self.out.push_str(&escape_attribute(standalone));
                    self.out.push('"');
                }
                self.out.push_str("?>");
            },
            XmlEvent::StartElement(start) => self.pending = Some(start.clone()),
            XmlEvent::EndElement(end) => {
                self.out.push_str("</");
                self.out.push_str(&end.name.qualified());
                self.out.push('>');
            },
            XmlEvent::Characters(text) => self.out.push_str(&escape_text(text)),
            XmlEvent::Comment(text) => {
                self.out.push_str("<!--");
                self.out.push_str(text);
                self.out.push_str("-->");
            },
            XmlEvent::ProcessingInstruction(content) => {
                self.out.push_str("<?");
                self.out.push_str(content);
                self.out.push_str("?>");
            },
        }
    }

    pub fn write_all<'a>(&mut self, events: impl IntoIterator<Item = &'a XmlEvent>) {
        for event in events {
            self.write(event);
        }
    }

    /// Finish writing and return the text.
    pub fn finish(mut self) -> String {
        self.flush_pending();
        self.out
    }

    fn flush_pending(&mut self) {
        if let Some(start) = self.pending.take() {
            self.write_start_tag(&start, false);
        }
    }

    fn write_start_tag(&mut self, start: &StartElement, empty: bool) {
        self.out.push('<');
        self.out.push_str(&start.name.qualified());
        for ns in &start.namespaces {
            if ns.prefix.is_empty() {
                self.out.push_str(" xmlns=\"");
            } else {
                self.out.push_str(" xmlns:");
                self.out.push_str(&ns.prefix);
                self.out.push_str("=\"");
            }
            self.out.push_str(&escape_attribute(&ns.uri));
            self.out.push('"');
        }
        for attribute in &start.attributes {
            self.out.push(' ');
            self.out.push_str(&attribute.name.qualified());
            self.out.push_str("=\"");
            self.out.push_str(&escape_attribute(&attribute.value));
            self.out.push('"');
        }
        self.out.push_str(if empty { "/>" } else { ">" });
    }
}

/// Serialize events to XML text.
pub fn serialize<'a>(events: impl IntoIterator<Item = &'a XmlEvent>) -> String {
    let mut writer = XmlWriter::new();
    writer.write_all(events);
    writer.finish()
}
