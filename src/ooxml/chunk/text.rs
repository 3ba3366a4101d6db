/// Text wrapped in its text element.
use crate::ooxml::event::{EndElement, StartElement, XmlEvent};

/// The content of a `w:t`, `a:t` or SpreadsheetML `t` element.
///
/// An empty text is written as an empty element.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    start: StartElement,
    text: String,
    end: EndElement,
}

impl Text {
    pub fn new(start: StartElement, text: impl Into<String>, end: EndElement) -> Self {
        Self {
            start,
            text: text.into(),
            end,
        }
    }

    #[inline]
    pub fn start(&self) -> &StartElement {
        &self.start
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn end(&self) -> &EndElement {
        &self.end
    }

    #[inline]
    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn set_start(&mut self, start: StartElement) {
        self.start = start;
    }

    pub fn events(&self) -> Vec<XmlEvent> {
        let mut events = Vec::with_capacity(3);
        events.push(XmlEvent::StartElement(self.start.clone()));
        if !self.text.is_empty() {
            events.push(XmlEvent::characters(self.text.clone()));
        }
        events.push(XmlEvent::EndElement(self.end.clone()));
        events
    }
}
