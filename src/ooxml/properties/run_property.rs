/// Single run property values.
///
/// A run property is either a child element of a run properties element
/// (`<w:b/>`, `<a:latin typeface="Arial"/>`) or, in DrawingML, an attribute
/// of `a:rPr` itself (`b="1"`, `sz="1800"`).
use phf::phf_set;

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::names::{
    DOCUMENT_RELATIONSHIPS, DRAWING_ML, LOCAL_ID, LOCAL_VAL, SPREADSHEET_ML, WORDPROCESSING_ML, wpml,
};
use crate::ooxml::event::{EventReader, QName, StartElement, XmlEvent, gather_element, parse_boolean};

/// WordprocessingML properties toggled by their `w:val`.
pub static WPML_TOGGLE_NAMES: phf::Set<&'static str> = phf_set! {
    "b", "bCs", "caps", "emboss", "i", "iCs", "imprint", "outline", "shadow", "smallCaps",
    "strike", "dstrike", "vanish", "specVanish", "noProof", "oMath", "cs", "rtl",
    "snapToGrid", "webHidden",
};

/// DrawingML `a:rPr` attributes holding booleans.
static DML_BOOLEAN_ATTRIBUTE_NAMES: phf::Set<&'static str> = phf_set! {
    "b", "dirty", "err", "i", "kumimoji", "noProof", "normalizeH", "smtClean",
};

static DML_HYPERLINK_NAMES: phf::Set<&'static str> = phf_set! { "hlinkClick", "hlinkMouseOver" };

static DML_FONT_NAMES: phf::Set<&'static str> = phf_set! { "latin", "ea", "cs", "sym" };

const SML_FONT_NAME: &str = "rFont";
const STYLE_NAME: &str = "rStyle";
const HIGHLIGHT_NAME: &str = "highlight";
const COLOR_NAME: &str = "color";
const SHADE_NAME: &str = "shd";
const SHADE_FILL: &str = "fill";
const SHADE_FILL_DEFAULT: &str = "auto";
const HYPERLINK_ACTION: &str = "action";
const FONT_TYPEFACE: &str = "typeface";

/// The events of an element-backed property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementProperty {
    start: StartElement,
    events: Vec<XmlEvent>,
}

impl ElementProperty {
    /// The first event must be a start element.
    pub fn new(events: Vec<XmlEvent>) -> Result<Self> {
        let start = events
            .first()
            .and_then(XmlEvent::as_start_element)
            .cloned()
            .ok_or_else(|| OoxmlError::illegal_state("A run property must start with a start element"))?;
        Ok(Self { start, events })
    }

    /// An empty element `<name attributes.../>`.
    pub fn empty(start: StartElement) -> Self {
        let end = start.end();
        Self {
            events: vec![XmlEvent::StartElement(start.clone()), XmlEvent::EndElement(end)],
            start,
        }
    }

    #[inline]
    pub fn start(&self) -> &StartElement {
        &self.start
    }

    #[inline]
    pub fn events(&self) -> &[XmlEvent] {
        &self.events
    }

    /// The `val` attribute, qualified with the element's namespace unless
    /// the element is unprefixed.
    fn val(&self) -> Option<&str> {
        let name = if self.start.name.prefix.is_empty() {
            QName::unqualified(LOCAL_VAL)
        } else {
            self.start.name.sibling(LOCAL_VAL)
        };
        self.start.attribute(&name)
    }

    fn wpml_val(&self) -> Option<&str> {
        self.start.attribute(&wpml(LOCAL_VAL))
    }
}

/// An attribute-backed property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeProperty {
    pub name: QName,
    pub value: String,
}

/// A run property.
#[derive(Debug, Clone)]
pub enum RunProperty {
    Generic(ElementProperty),
    /// `w:shd`
    Shade(ElementProperty),
    /// `w:rStyle`
    Style(ElementProperty),
    /// `w:highlight`
    Highlight(ElementProperty),
    /// `w:color`
    Color(ElementProperty),
    /// A WordprocessingML toggle such as `w:b` or `w:vanish`
    WpmlToggle(ElementProperty),
    /// A SpreadsheetML rich text property
    Sml(ElementProperty),
    /// `a:hlinkClick`, `a:hlinkMouseOver`
    Hyperlink(ElementProperty),
    /// `a:latin`, `a:ea`, `a:cs`, `a:sym`, SpreadsheetML `rFont`
    Font(ElementProperty),
    Attribute(AttributeProperty),
    BooleanAttribute(AttributeProperty),
}

impl RunProperty {
    /// Gather the element started by `start` from `reader` and classify it.
    pub fn from_element(start: StartElement, reader: &mut EventReader<'_>) -> Result<Self> {
        Self::from_events(gather_element(start, reader)?)
    }

    /// Classify an already gathered property element.
    pub fn from_events(events: Vec<XmlEvent>) -> Result<Self> {
        let element = ElementProperty::new(events)?;
        let name = &element.start.name;
        let local = name.local.as_str();
        let kind: fn(ElementProperty) -> RunProperty = match name.namespace.as_str() {
            DRAWING_ML if DML_HYPERLINK_NAMES.contains(local) => RunProperty::Hyperlink,
            DRAWING_ML if DML_FONT_NAMES.contains(local) => RunProperty::Font,
            WORDPROCESSING_ML => match local {
                STYLE_NAME => RunProperty::Style,
                HIGHLIGHT_NAME => RunProperty::Highlight,
                COLOR_NAME => RunProperty::Color,
                SHADE_NAME => RunProperty::Shade,
                _ if WPML_TOGGLE_NAMES.contains(local) => RunProperty::WpmlToggle,
                _ => RunProperty::Generic,
            },
            SPREADSHEET_ML if local == SML_FONT_NAME => RunProperty::Font,
            _ if name.prefix.is_empty() => RunProperty::Sml,
            _ => RunProperty::Generic,
        };
        Ok(kind(element))
    }

    /// An attribute of DrawingML `a:rPr`.
    pub fn from_attribute(name: QName, value: impl Into<String>) -> Self {
        let property = AttributeProperty {
            value: value.into(),
            name,
        };
        if DML_BOOLEAN_ATTRIBUTE_NAMES.contains(property.name.local.as_str()) {
            RunProperty::BooleanAttribute(property)
        } else {
            RunProperty::Attribute(property)
        }
    }

    /// An empty generic element `<name attributes.../>`.
    pub fn generic(start: StartElement) -> Self {
        RunProperty::Generic(ElementProperty::empty(start))
    }

    fn element(&self) -> Option<&ElementProperty> {
        match self {
            RunProperty::Generic(e)
            | RunProperty::Shade(e)
            | RunProperty::Style(e)
            | RunProperty::Highlight(e)
            | RunProperty::Color(e)
            | RunProperty::WpmlToggle(e)
            | RunProperty::Sml(e)
            | RunProperty::Hyperlink(e)
            | RunProperty::Font(e) => Some(e),
            RunProperty::Attribute(_) | RunProperty::BooleanAttribute(_) => None,
        }
    }

    pub fn name(&self) -> &QName {
        match self {
            RunProperty::Attribute(a) | RunProperty::BooleanAttribute(a) => &a.name,
            RunProperty::Generic(e)
            | RunProperty::Shade(e)
            | RunProperty::Style(e)
            | RunProperty::Highlight(e)
            | RunProperty::Color(e)
            | RunProperty::WpmlToggle(e)
            | RunProperty::Sml(e)
            | RunProperty::Hyperlink(e)
            | RunProperty::Font(e) => &e.start.name,
        }
    }

    #[inline]
    pub fn local_name(&self) -> &str {
        &self.name().local
    }

    /// The property events; empty for attribute properties.
    pub fn events(&self) -> &[XmlEvent] {
        self.element().map(ElementProperty::events).unwrap_or(&[])
    }

    /// The start element of an element property.
    pub fn start(&self) -> Option<&StartElement> {
        self.element().map(ElementProperty::start)
    }

    /// The property value as a string.
    pub fn value(&self) -> Option<&str> {
        match self {
            RunProperty::Attribute(a) | RunProperty::BooleanAttribute(a) => Some(&a.value),
            RunProperty::Generic(e) | RunProperty::Shade(e) | RunProperty::WpmlToggle(e) | RunProperty::Sml(e) => {
                e.val()
            },
            RunProperty::Style(e) | RunProperty::Highlight(e) | RunProperty::Color(e) => e.wpml_val(),
            RunProperty::Hyperlink(e) => e
                .start
                .attribute(&QName::unqualified(HYPERLINK_ACTION))
                .or_else(|| e.start.attribute(&QName::new(DOCUMENT_RELATIONSHIPS, LOCAL_ID, "r"))),
            RunProperty::Font(e) => e
                .start
                .attribute(&QName::unqualified(FONT_TYPEFACE))
                .or_else(|| e.val()),
        }
    }

    /// The state of a toggle or boolean attribute property.
    ///
    /// A toggle without `w:val` is on.
    pub fn toggle_value(&self) -> Option<bool> {
        match self {
            RunProperty::WpmlToggle(e) => Some(e.wpml_val().and_then(parse_boolean).unwrap_or(true)),
            RunProperty::BooleanAttribute(a) => Some(parse_boolean(&a.value).unwrap_or(false)),
            _ => None,
        }
    }

    /// The `w:fill` of a shade property, `auto` when absent.
    pub fn fill_value(&self) -> Option<&str> {
        match self {
            RunProperty::Shade(e) => Some(
                e.start
                    .attribute(&wpml(SHADE_FILL))
                    .unwrap_or(SHADE_FILL_DEFAULT),
            ),
            _ => None,
        }
    }

    /// The value a SpreadsheetML property takes when its `val` is absent.
    pub fn default_value(&self) -> Option<&'static str> {
        match self {
            RunProperty::Sml(e) => Some(match e.start.name.local.as_str() {
                "b" | "i" | "shadow" | "strike" => "true",
                "u" => "single",
                _ => "",
            }),
            _ => None,
        }
    }

    #[inline]
    pub fn is_toggle(&self) -> bool {
        matches!(self, RunProperty::WpmlToggle(_))
    }

    #[inline]
    pub fn is_attribute(&self) -> bool {
        matches!(self, RunProperty::Attribute(_) | RunProperty::BooleanAttribute(_))
    }

    /// Whether `other` may stand in for this property.
    #[inline]
    pub fn can_be_replaced(&self, other: &RunProperty) -> bool {
        self == other
    }
}

impl PartialEq for RunProperty {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Generic(a), Self::Generic(b))
            | (Self::Shade(a), Self::Shade(b))
            | (Self::Hyperlink(a), Self::Hyperlink(b))
            | (Self::Font(a), Self::Font(b)) => a.events == b.events,
            (Self::Style(a), Self::Style(b)) | (Self::Highlight(a), Self::Highlight(b)) | (Self::Color(a), Self::Color(b)) => {
                a.wpml_val() == b.wpml_val()
            },
            (Self::WpmlToggle(a), Self::WpmlToggle(b)) => {
                a.start.name == b.start.name && self.toggle_value() == other.toggle_value()
            },
            (Self::Sml(a), Self::Sml(b)) => a.start == b.start && a.val() == b.val(),
            (Self::Attribute(a), Self::Attribute(b)) => a == b,
            (Self::BooleanAttribute(a), Self::BooleanAttribute(b)) => {
                a.name == b.name && self.toggle_value() == other.toggle_value()
            },
            _ => false,
        }
    }
}

impl Eq for RunProperty {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::event::names::{dml, sml};

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;
    const A: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#;

    fn parse(xml: &str) -> RunProperty {
        let mut reader = EventReader::from_str(xml);
        let start = reader.next_event().unwrap().unwrap().as_start_element().unwrap().clone();
        RunProperty::from_element(start, &mut reader).unwrap()
    }

    #[test]
    fn test_wpml_dispatch() {
        assert!(matches!(parse(&format!(r#"<w:rStyle {W} w:val="Strong"/>"#)), RunProperty::Style(_)));
        assert!(matches!(parse(&format!(r#"<w:b {W}/>"#)), RunProperty::WpmlToggle(_)));
        assert!(matches!(parse(&format!(r#"<w:shd {W} w:val="clear"/>"#)), RunProperty::Shade(_)));
        assert!(matches!(parse(&format!(r#"<w:sz {W} w:val="24"/>"#)), RunProperty::Generic(_)));
    }

    #[test]
    fn test_dml_dispatch_and_values() {
        let font = parse(&format!(r#"<a:latin {A} typeface="Arial"/>"#));
        assert!(matches!(font, RunProperty::Font(_)));
        assert_eq!(font.value(), Some("Arial"));

        let link = parse(&format!(
            r#"<a:hlinkClick {A} xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" r:id="rId3"/>"#
        ));
        assert!(matches!(link, RunProperty::Hyperlink(_)));
        assert_eq!(link.value(), Some("rId3"));
    }

    #[test]
    fn test_toggle_defaults_to_on() {
        let on = parse(&format!(r#"<w:b {W}/>"#));
        let off = parse(&format!(r#"<w:b {W} w:val="0"/>"#));
        assert_eq!(on.toggle_value(), Some(true));
        assert_eq!(off.toggle_value(), Some(false));
        assert_ne!(on, off);
    }

    #[test]
    fn test_style_equality_by_value() {
        let a = RunProperty::Style(ElementProperty::empty(
            StartElement::new(wpml("rStyle")).with_attribute(wpml("val"), "Emphasis"),
        ));
        let b = parse(&format!(r#"<w:rStyle {W} w:val="Emphasis"></w:rStyle>"#));
        assert_eq!(a, b);
    }

    #[test]
    fn test_sml_defaults() {
        let bold = RunProperty::from_events(vec![XmlEvent::start(sml("b")), XmlEvent::end(sml("b"))]).unwrap();
        assert!(matches!(bold, RunProperty::Sml(_)));
        assert_eq!(bold.default_value(), Some("true"));
        assert_eq!(bold.value(), None);

        let font = RunProperty::from_events(vec![
            StartElement::new(sml("rFont")).with_attribute(QName::unqualified("val"), "Calibri").into(),
            XmlEvent::end(sml("rFont")),
        ])
        .unwrap();
        assert_eq!(font.value(), Some("Calibri"));
    }

    #[test]
    fn test_attribute_properties() {
        let b = RunProperty::from_attribute(QName::unqualified("b"), "1");
        let sz = RunProperty::from_attribute(QName::unqualified("sz"), "1800");
        assert!(matches!(b, RunProperty::BooleanAttribute(_)));
        assert_eq!(b.toggle_value(), Some(true));
        assert!(matches!(sz, RunProperty::Attribute(_)));
        assert!(sz.events().is_empty());
        assert_eq!(RunProperty::from_attribute(QName::unqualified("b"), "true"), b);
    }

    #[test]
    fn test_shade_fill_default() {
        let shade = RunProperty::Shade(ElementProperty::empty(StartElement::new(wpml("shd"))));
        assert_eq!(shade.fill_value(), Some("auto"));
        assert_eq!(RunProperty::generic(StartElement::new(dml("solidFill"))).fill_value(), None);
    }

    #[test]
    fn test_element_property_requires_start() {
        assert!(ElementProperty::new(vec![XmlEvent::characters("x")]).is_err());
    }
}
