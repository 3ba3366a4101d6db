/// Single block property values.
use super::RunProperties;
use crate::ooxml::config::FilterOptions;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::names::{DRAWING_ML, LOCAL_VAL, WORDPROCESSING_ML, wpml};
use crate::ooxml::event::{Attribute, EventReader, QName, StartElement, XmlEvent, gather_element};
use crate::ooxml::parser::parse_run_properties;
use crate::ooxml::policy::{RunSkippableElements, StrippableAttributes};

const RUN_PROPERTIES: &str = "rPr";
const DEFAULT_RUN_PROPERTIES: &str = "defRPr";

/// A child element of a block properties element, such as `w:jc` or
/// `a:defRPr`, kept as its events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockProperty {
    start: StartElement,
    events: Vec<XmlEvent>,
}

impl BlockProperty {
    /// The first event must be a start element.
    pub fn new(events: Vec<XmlEvent>) -> Result<Self> {
        let start = events
            .first()
            .and_then(XmlEvent::as_start_element)
            .cloned()
            .ok_or_else(|| OoxmlError::illegal_state("A block property must start with a start element"))?;
        Ok(Self { start, events })
    }

    /// Gather the element started by `start` from `reader`.
    pub fn from_element(start: StartElement, reader: &mut EventReader<'_>) -> Result<Self> {
        Self::new(gather_element(start, reader)?)
    }

    /// An empty element named `local` in the namespace of `sibling`, with
    /// its attributes in the same namespace.
    pub fn with_attributes<'a>(sibling: &QName, local: &str, attributes: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let start = StartElement::new(sibling.sibling(local)).with_attributes(
            attributes
                .into_iter()
                .map(|(name, value)| Attribute::new(sibling.sibling(name), value)),
        );
        let end = start.end();
        Self {
            events: vec![XmlEvent::StartElement(start.clone()), XmlEvent::EndElement(end)],
            start,
        }
    }

    /// A property holding the markup of `run_properties`.
    pub fn from_run_properties(run_properties: &RunProperties) -> Result<Self> {
        let events = run_properties.events();
        if events.is_empty() {
            let start = StartElement::new(run_properties.name().clone());
            let end = start.end();
            return Self::new(vec![start.into(), end.into()]);
        }
        Self::new(events)
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
    pub fn events(&self) -> &[XmlEvent] {
        &self.events
    }

    /// The `val` attribute: `w:val` for WordprocessingML, an unqualified
    /// `val` for DrawingML.
    pub fn value(&self) -> Result<Option<&str>> {
        match self.start.name.namespace.as_str() {
            WORDPROCESSING_ML => Ok(self.start.attribute(&wpml(LOCAL_VAL))),
            DRAWING_ML => Ok(self.start.attribute(&QName::unqualified(LOCAL_VAL))),
            _ => Err(OoxmlError::illegal_state(format!(
                "Unsupported block property namespace: {}",
                self.start.name
            ))),
        }
    }

    /// Whether this property nests run properties (`rPr`, `defRPr`).
    #[inline]
    pub fn holds_run_properties(&self) -> bool {
        matches!(self.start.name.local.as_str(), RUN_PROPERTIES | DEFAULT_RUN_PROPERTIES)
    }

    /// Parse the nested run properties.
    pub fn as_run_properties(&self, options: &FilterOptions) -> Result<RunProperties> {
        if !self.holds_run_properties() {
            return Err(OoxmlError::illegal_state(format!(
                "{} does not hold run properties",
                self.start.name
            )));
        }
        let stripped = StrippableAttributes::drawing_run_properties(options).strip(&self.start);
        let mut reader = EventReader::from_events(self.events.iter().skip(1).cloned());
        let mut skippable = RunSkippableElements::new(&stripped, options).properties().clone();
        let run_properties = parse_run_properties(&stripped, &mut reader, &mut skippable, options)?;
        if run_properties.is_empty() {
            let end = self.start.end();
            return Ok(RunProperties::new(self.start.clone(), end, Vec::new()));
        }
        Ok(run_properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::event::names::dml;

    const A: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#;
    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn parse(xml: &str) -> BlockProperty {
        let mut reader = EventReader::from_str(xml);
        let start = reader.next_event().unwrap().unwrap().as_start_element().unwrap().clone();
        BlockProperty::from_element(start, &mut reader).unwrap()
    }

    #[test]
    fn test_value_by_dialect() {
        assert_eq!(parse(&format!(r#"<w:jc {W} w:val="center"/>"#)).value().unwrap(), Some("center"));
        assert_eq!(parse(&format!(r#"<a:buFont {A} val="x"/>"#)).value().unwrap(), Some("x"));
        let other = BlockProperty::with_attributes(&QName::unqualified("x"), "y", []);
        assert!(other.value().is_err());
    }

    #[test]
    fn test_default_run_properties() {
        let property = parse(&format!(r#"<a:defRPr {A} sz="2400" lang="en-US"><a:solidFill/></a:defRPr>"#));
        let rpr = property.as_run_properties(&FilterOptions::default()).unwrap();
        let names: Vec<&str> = rpr.properties().iter().map(|p| p.local_name()).collect();
        assert_eq!(names, vec!["sz", "solidFill"]);
    }

    #[test]
    fn test_empty_run_properties_keep_element() {
        let property = parse(&format!(r#"<a:defRPr {A} lang="en-US"/>"#));
        let rpr = property.as_run_properties(&FilterOptions::default()).unwrap();
        assert!(rpr.is_empty());
        assert_eq!(rpr.name(), &dml("defRPr"));
    }

    #[test]
    fn test_only_run_properties_convert() {
        let property = parse(&format!(r#"<w:jc {W} w:val="left"/>"#));
        assert!(matches!(
            property.as_run_properties(&FilterOptions::default()),
            Err(OoxmlError::IllegalState(_))
        ));
    }

    #[test]
    fn test_with_attributes() {
        let property = BlockProperty::with_attributes(&wpml("pPr"), "pStyle", [("val", "Heading1")]);
        assert_eq!(property.name(), &wpml("pStyle"));
        assert_eq!(property.value().unwrap(), Some("Heading1"));
        assert_eq!(property.events().len(), 2);
    }
}
