/// Block property bags.
use super::BlockProperty;
use crate::ooxml::event::{Attribute, EndElement, QName, StartElement, XmlEvent};

pub const TABLE_PROPERTIES: &str = "tblPr";
pub const TABLE_ROW_PROPERTIES: &str = "trPr";
pub const TABLE_CELL_PROPERTIES: &str = "tcPr";
pub const TABLE_STYLE_PROPERTIES: &str = "tblStylePr";
pub const BODY_PROPERTIES: &str = "bodyPr";
pub const SMART_TAG_PROPERTIES: &str = "smartTagPr";
pub const STRUCTURED_DOCUMENT_TAG_PROPERTIES: &str = "sdtPr";
pub const STRUCTURED_DOCUMENT_TAG_END_PROPERTIES: &str = "sdtEndPr";

/// The properties element of a block-level construct (`w:pPr`, `w:tblPr`,
/// `a:bodyPr`, ...), holding its attributes on the start element and its
/// children as [`BlockProperty`] values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockProperties {
    start: StartElement,
    end: EndElement,
    properties: Vec<BlockProperty>,
}

impl BlockProperties {
    pub fn new(start: StartElement, end: EndElement, properties: Vec<BlockProperty>) -> Self {
        Self { start, end, properties }
    }

    pub fn empty(name: QName) -> Self {
        let start = StartElement::new(name);
        let end = start.end();
        Self::new(start, end, Vec::new())
    }

    #[inline]
    pub fn name(&self) -> &QName {
        &self.start.name
    }

    #[inline]
    pub fn start(&self) -> &StartElement {
        &self.start
    }

    #[inline]
    pub fn start_mut(&mut self) -> &mut StartElement {
        &mut self.start
    }

    #[inline]
    pub fn end(&self) -> &EndElement {
        &self.end
    }

    #[inline]
    pub fn attributes(&self) -> &[Attribute] {
        &self.start.attributes
    }

    #[inline]
    pub fn set_attributes(&mut self, attributes: impl IntoIterator<Item = Attribute>) {
        self.start.attributes = attributes.into_iter().collect();
    }

    /// The same properties under another element name.
    pub fn renamed(mut self, name: QName) -> Self {
        self.start.name = name.clone();
        self.end.name = name;
        self
    }

    #[inline]
    pub fn properties(&self) -> &[BlockProperty] {
        &self.properties
    }

    #[inline]
    pub fn properties_mut(&mut self) -> &mut Vec<BlockProperty> {
        &mut self.properties
    }

    /// No attributes and no properties.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start.attributes.is_empty() && self.properties.is_empty()
    }

    pub fn get(&self, name: &QName) -> Option<&BlockProperty> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn get_local(&self, local: &str) -> Option<&BlockProperty> {
        self.properties.iter().find(|p| p.name().local == local)
    }

    /// The markup of this element.
    ///
    /// Empty bags produce nothing, except `bodyPr`, which text bodies
    /// require.
    pub fn events(&self) -> Vec<XmlEvent> {
        if self.is_empty() && self.start.name.local != BODY_PROPERTIES {
            return Vec::new();
        }
        let mut events = Vec::with_capacity(2 + self.properties.iter().map(|p| p.events().len()).sum::<usize>());
        events.push(XmlEvent::StartElement(self.start.clone()));
        for property in &self.properties {
            events.extend_from_slice(property.events());
        }
        events.push(XmlEvent::EndElement(self.end.clone()));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::event::names::{dml, wpml};

    #[test]
    fn test_empty_properties_are_omitted() {
        assert!(BlockProperties::empty(wpml("tblPr")).events().is_empty());
        assert_eq!(BlockProperties::empty(dml("bodyPr")).events().len(), 2);
    }

    #[test]
    fn test_attributes_make_properties_non_empty() {
        let start = StartElement::new(dml("pPr")).with_attribute(QName::unqualified("algn"), "ctr");
        let end = start.end();
        let properties = BlockProperties::new(start, end, Vec::new());
        assert!(!properties.is_empty());
        assert_eq!(properties.events().len(), 2);
    }

    #[test]
    fn test_property_lookup() {
        let mut properties = BlockProperties::empty(wpml("pPr"));
        properties
            .properties_mut()
            .push(BlockProperty::with_attributes(&wpml("pPr"), "jc", [("val", "center")]));
        assert!(properties.get(&wpml("jc")).is_some());
        assert!(properties.get_local("ind").is_none());
        assert_eq!(properties.events().len(), 4);
    }
}
