/// Paragraph properties.
use super::{BlockProperties, BlockProperty, RunProperty};
use crate::ooxml::config::FilterOptions;
use crate::ooxml::error::Result;
use crate::ooxml::event::names::{DRAWING_ML, LOCAL_VAL, wpml};
use crate::ooxml::event::{Attribute, QName, StartElement, XmlEvent};

const PARAGRAPH_STYLE: &str = "pStyle";
const LEVEL: &str = "lvl";
const HIGHLIGHT: &str = "highlight";
const COLOR: &str = "color";
const RUN_PROPERTIES: &str = "rPr";
const DELETED: &str = "del";

/// Children of DrawingML paragraph properties in schema order.
const DRAWING_PARAGRAPH_PROPERTIES_ORDER: &[&str] = &[
    "lnSpc", "spcBef", "spcAft", "buClrTx", "buClr", "buSzTx", "buSzPct", "buSzPts", "buFontTx", "buFont",
    "buNone", "buAutoNum", "buChar", "buBlip", "tabLst", "defRPr", "extLst",
];

/// Whether `name` denotes paragraph properties: `pPr`, `defPPr` or a list
/// level `lvl1pPr`..`lvl9pPr`.
pub fn is_paragraph_properties(name: &QName) -> bool {
    match name.local.as_str() {
        "pPr" | "defPPr" => true,
        local => local
            .strip_prefix(LEVEL)
            .and_then(|rest| rest.strip_suffix("pPr"))
            .is_some_and(|digit| matches!(digit, "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9")),
    }
}

/// The markup dialect of paragraph properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphDialect {
    /// WordprocessingML `w:pPr`
    Word,
    /// DrawingML `a:pPr`, `a:lvlNpPr`
    Drawing,
}

impl ParagraphDialect {
    pub fn for_name(name: &QName) -> Self {
        if name.is_in(DRAWING_ML) {
            ParagraphDialect::Drawing
        } else {
            ParagraphDialect::Word
        }
    }
}

/// Paragraph-level block properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphBlockProperties {
    dialect: ParagraphDialect,
    inner: BlockProperties,
}

impl ParagraphBlockProperties {
    pub fn new(inner: BlockProperties) -> Self {
        Self {
            dialect: ParagraphDialect::for_name(inner.name()),
            inner,
        }
    }

    pub fn empty(name: QName) -> Self {
        Self::new(BlockProperties::empty(name))
    }

    /// The same properties under another element name, e.g. a list level
    /// resolved into paragraph properties.
    pub fn renamed(self, name: QName) -> Self {
        Self::new(self.inner.renamed(name))
    }

    #[inline]
    pub fn dialect(&self) -> ParagraphDialect {
        self.dialect
    }

    #[inline]
    pub fn block_properties(&self) -> &BlockProperties {
        &self.inner
    }

    #[inline]
    pub fn name(&self) -> &QName {
        self.inner.name()
    }

    #[inline]
    pub fn start(&self) -> &StartElement {
        self.inner.start()
    }

    #[inline]
    pub fn start_mut(&mut self) -> &mut StartElement {
        self.inner.start_mut()
    }

    #[inline]
    pub fn attributes(&self) -> &[Attribute] {
        self.inner.attributes()
    }

    #[inline]
    pub fn properties(&self) -> &[BlockProperty] {
        self.inner.properties()
    }

    #[inline]
    pub fn properties_mut(&mut self) -> &mut Vec<BlockProperty> {
        self.inner.properties_mut()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn events(&self) -> Vec<XmlEvent> {
        self.inner.events()
    }

    fn word_property(&self, local: &str) -> Option<&BlockProperty> {
        self.inner.get(&self.inner.name().sibling(local))
    }

    fn word_value(&self, local: &str) -> Option<&str> {
        self.word_property(local)
            .and_then(|p| p.start().attribute(&wpml(LOCAL_VAL)))
    }

    /// The paragraph style id: `w:pStyle` in Word, the `lvl` attribute in
    /// DrawingML.
    pub fn paragraph_style(&self) -> Option<&str> {
        match self.dialect {
            ParagraphDialect::Word => self.word_value(PARAGRAPH_STYLE),
            ParagraphDialect::Drawing => self
                .inner
                .attributes()
                .iter()
                .find(|a| a.name.local == LEVEL)
                .map(|a| a.value.as_str()),
        }
    }

    pub fn highlight_color(&self) -> Option<&str> {
        match self.dialect {
            ParagraphDialect::Word => self.word_value(HIGHLIGHT),
            ParagraphDialect::Drawing => None,
        }
    }

    pub fn text_color(&self) -> Option<&str> {
        match self.dialect {
            ParagraphDialect::Word => self.word_value(COLOR),
            ParagraphDialect::Drawing => None,
        }
    }

    /// Whether the paragraph mark run properties record a deletion.
    pub fn contains_run_property_deleted_paragraph_mark(&self) -> bool {
        if self.dialect == ParagraphDialect::Drawing {
            return false;
        }
        let deleted = wpml(DELETED);
        self.inner
            .properties()
            .iter()
            .filter(|p| p.name().local == RUN_PROPERTIES)
            .flat_map(BlockProperty::events)
            .any(|e| matches!(e, XmlEvent::StartElement(s) if s.name == deleted))
    }

    /// Record a hoisted style.
    ///
    /// Word paragraphs reference the style through `w:pStyle`. DrawingML
    /// paragraphs take the common run properties into the inner run
    /// properties element `inner` (`a:defRPr`), which is created in schema
    /// order when missing.
    pub fn refine(
        &mut self,
        inner: &QName,
        style_id: &str,
        common: &[RunProperty],
        options: &FilterOptions,
    ) -> Result<()> {
        match self.dialect {
            ParagraphDialect::Word => {
                let property = BlockProperty::with_attributes(self.inner.name(), PARAGRAPH_STYLE, [(LOCAL_VAL, style_id)]);
                let properties = self.inner.properties_mut();
                match properties.iter().position(|p| p.name().local == PARAGRAPH_STYLE) {
                    Some(index) => properties[index] = property,
                    None => properties.insert(0, property),
                }
                Ok(())
            },
            ParagraphDialect::Drawing => {
                if let Some(index) = self.inner.properties().iter().position(|p| p.name() == inner) {
                    let mut run_properties = self.inner.properties()[index].as_run_properties(options)?;
                    run_properties.refine(common);
                    self.inner.properties_mut()[index] = BlockProperty::from_run_properties(&run_properties)?;
                    return Ok(());
                }

                let start = StartElement::new(inner.clone()).with_attributes(common.iter().filter_map(|p| match p {
                    RunProperty::Attribute(a) | RunProperty::BooleanAttribute(a) => {
                        Some(Attribute::new(a.name.clone(), a.value.clone()))
                    },
                    _ => None,
                }));
                let end = start.end();
                let mut events = vec![XmlEvent::StartElement(start)];
                for property in common.iter().filter(|p| !p.is_attribute()) {
                    events.extend_from_slice(property.events());
                }
                events.push(XmlEvent::EndElement(end));
                let property = BlockProperty::new(events)?;

                let position = schema_position(self.inner.properties(), &inner.local);
                self.inner.properties_mut().insert(position, property);
                Ok(())
            },
        }
    }

    /// A copy without the paragraph style reference.
    ///
    /// DrawingML levels are structural and are kept.
    pub fn without_paragraph_style(&self) -> Self {
        match self.dialect {
            ParagraphDialect::Word => {
                let mut copy = self.clone();
                copy.inner
                    .properties_mut()
                    .retain(|p| p.name().local != PARAGRAPH_STYLE);
                copy
            },
            ParagraphDialect::Drawing => self.clone(),
        }
    }

    /// Whether every property (and, in DrawingML, every attribute) of
    /// `other` is present here.
    pub fn mergeable_with(&self, other: &ParagraphBlockProperties) -> bool {
        let properties = other.properties().iter().all(|p| self.properties().contains(p));
        match self.dialect {
            ParagraphDialect::Word => properties,
            ParagraphDialect::Drawing => {
                properties && other.attributes().iter().all(|a| self.attributes().contains(a))
            },
        }
    }

    /// Our properties not named in `other`, followed by those of `other`.
    /// DrawingML attributes merge the same way.
    pub fn merged_with(&self, other: &ParagraphBlockProperties) -> Self {
        let mut merged = self.clone();
        let properties = merged.inner.properties_mut();
        properties.retain(|p| !other.properties().iter().any(|o| o.name() == p.name()));
        properties.extend(other.properties().iter().cloned());

        if self.dialect == ParagraphDialect::Drawing {
            let attributes: Vec<Attribute> = self
                .attributes()
                .iter()
                .filter(|a| !other.attributes().iter().any(|o| o.name == a.name))
                .chain(other.attributes())
                .cloned()
                .collect();
            merged.inner.set_attributes(attributes);
        }
        merged
    }
}

/// The index before the first property that follows `local` in schema order.
fn schema_position(properties: &[BlockProperty], local: &str) -> usize {
    let Some(order) = DRAWING_PARAGRAPH_PROPERTIES_ORDER.iter().position(|n| *n == local) else {
        return properties.len();
    };
    let following = &DRAWING_PARAGRAPH_PROPERTIES_ORDER[order + 1..];
    properties
        .iter()
        .position(|p| following.contains(&p.name().local.as_str()))
        .unwrap_or(properties.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::event::names::dml;

    fn word(properties: Vec<BlockProperty>) -> ParagraphBlockProperties {
        let mut p = ParagraphBlockProperties::empty(wpml("pPr"));
        p.properties_mut().extend(properties);
        p
    }

    fn wp(local: &str, value: &str) -> BlockProperty {
        BlockProperty::with_attributes(&wpml("pPr"), local, [("val", value)])
    }

    #[test]
    fn test_paragraph_property_names() {
        assert!(is_paragraph_properties(&wpml("pPr")));
        assert!(is_paragraph_properties(&dml("lvl3pPr")));
        assert!(is_paragraph_properties(&dml("defPPr")));
        assert!(!is_paragraph_properties(&dml("lvl10pPr")));
        assert!(!is_paragraph_properties(&wpml("rPr")));
    }

    #[test]
    fn test_word_paragraph_style() {
        let p = word(vec![wp("jc", "left"), wp("pStyle", "Heading1"), wp("highlight", "yellow")]);
        assert_eq!(p.dialect(), ParagraphDialect::Word);
        assert_eq!(p.paragraph_style(), Some("Heading1"));
        assert_eq!(p.highlight_color(), Some("yellow"));
        assert_eq!(p.text_color(), None);
        assert_eq!(p.without_paragraph_style().paragraph_style(), None);
    }

    #[test]
    fn test_drawing_level_is_the_style() {
        let start = StartElement::new(dml("pPr")).with_attribute(QName::unqualified("lvl"), "2");
        let end = start.end();
        let p = ParagraphBlockProperties::new(BlockProperties::new(start, end, Vec::new()));
        assert_eq!(p.paragraph_style(), Some("2"));
        assert_eq!(p.without_paragraph_style(), p);
    }

    #[test]
    fn test_word_refine_replaces_style() {
        let mut p = word(vec![wp("jc", "left")]);
        p.refine(&wpml("pStyle"), "Style1", &[], &FilterOptions::default()).unwrap();
        assert_eq!(p.properties()[0].name(), &wpml("pStyle"));
        p.refine(&wpml("pStyle"), "Style2", &[], &FilterOptions::default()).unwrap();
        assert_eq!(p.properties().len(), 2);
        assert_eq!(p.paragraph_style(), Some("Style2"));
    }

    #[test]
    fn test_drawing_refine_creates_default_run_properties_in_order() {
        let mut p = ParagraphBlockProperties::empty(dml("lvl1pPr"));
        p.properties_mut()
            .push(BlockProperty::with_attributes(&dml("lvl1pPr"), "buNone", []));
        p.properties_mut()
            .push(BlockProperty::with_attributes(&dml("lvl1pPr"), "extLst", []));
        let common = vec![RunProperty::from_attribute(QName::unqualified("b"), "1")];
        p.refine(&dml("defRPr"), "", &common, &FilterOptions::default()).unwrap();

        let names: Vec<&str> = p.properties().iter().map(|q| q.name().local.as_str()).collect();
        assert_eq!(names, vec!["buNone", "defRPr", "extLst"]);
        assert_eq!(p.properties()[1].start().attribute_by_local("b"), Some("1"));

        let common = vec![RunProperty::from_attribute(QName::unqualified("sz"), "1200")];
        p.refine(&dml("defRPr"), "", &common, &FilterOptions::default()).unwrap();
        let rpr = p.properties()[1].as_run_properties(&FilterOptions::default()).unwrap();
        assert_eq!(rpr.count(), 2);
    }

    #[test]
    fn test_deleted_paragraph_mark() {
        let rpr = BlockProperty::new(vec![
            XmlEvent::start(wpml("rPr")),
            XmlEvent::start(wpml("del")),
            XmlEvent::end(wpml("del")),
            XmlEvent::end(wpml("rPr")),
        ])
        .unwrap();
        assert!(word(vec![rpr]).contains_run_property_deleted_paragraph_mark());
        assert!(!word(vec![wp("jc", "left")]).contains_run_property_deleted_paragraph_mark());
    }

    #[test]
    fn test_merge() {
        let a = word(vec![wp("jc", "left"), wp("ind", "10")]);
        let b = word(vec![wp("jc", "left")]);
        assert!(a.mergeable_with(&b));
        assert!(!b.mergeable_with(&a));

        let c = word(vec![wp("jc", "right")]);
        let merged = a.merged_with(&c);
        let names: Vec<&str> = merged.properties().iter().map(|q| q.name().local.as_str()).collect();
        assert_eq!(names, vec!["ind", "jc"]);
        assert_eq!(merged.properties()[1], wp("jc", "right"));
    }
}
