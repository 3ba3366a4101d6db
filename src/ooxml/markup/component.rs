/// Markup components.
use crate::ooxml::event::names::{
    LOCAL_ALIGNMENT, LOCAL_DOC_DEFAULTS, LOCAL_PARAGRAPH_PROPERTIES_DEFAULT, LOCAL_PRESENTATION,
    LOCAL_RUN_PROPERTIES_DEFAULT, LOCAL_SHEET_VIEW, LOCAL_STYLE, LOCAL_STYLES, LOCAL_TABLE, LOCAL_TEXT_BODY,
};
use crate::ooxml::event::{EndElement, QName, StartElement, XmlEvent};
use crate::ooxml::properties::{BlockProperties, ParagraphBlockProperties, RunProperties, TABLE_PROPERTIES};
use crate::ooxml::styles::SharedStyles;
use std::sync::Arc;

/// A piece of non-textual markup.
#[derive(Debug, Clone)]
pub enum MarkupComponent {
    Start(StartElement),
    End(EndElement),
    /// An element without content
    EmptyElement(StartElement),
    /// The start of a paragraph, with the styles it is resolved against
    ParagraphStart { start: StartElement, styles: SharedStyles },
    /// Opaque events passed through unchanged
    General(Vec<XmlEvent>),
    BlockProperties(BlockProperties),
    ParagraphBlockProperties(ParagraphBlockProperties),
    RunProperties(RunProperties),
}

impl MarkupComponent {
    #[inline]
    pub fn start(start: StartElement) -> Self {
        MarkupComponent::Start(start)
    }

    #[inline]
    pub fn end(end: EndElement) -> Self {
        MarkupComponent::End(end)
    }

    #[inline]
    pub fn paragraph_start(start: StartElement, styles: SharedStyles) -> Self {
        MarkupComponent::ParagraphStart { start, styles }
    }

    /// Block properties, typed as paragraph properties when named so.
    pub fn from_block_properties(properties: BlockProperties) -> Self {
        if crate::ooxml::properties::is_paragraph_properties(properties.name()) {
            MarkupComponent::ParagraphBlockProperties(ParagraphBlockProperties::new(properties))
        } else {
            MarkupComponent::BlockProperties(properties)
        }
    }

    pub fn events(&self) -> Vec<XmlEvent> {
        match self {
            MarkupComponent::Start(start) | MarkupComponent::ParagraphStart { start, .. } => {
                vec![XmlEvent::StartElement(start.clone())]
            },
            MarkupComponent::End(end) => vec![XmlEvent::EndElement(end.clone())],
            MarkupComponent::EmptyElement(start) => {
                vec![XmlEvent::StartElement(start.clone()), XmlEvent::EndElement(start.end())]
            },
            MarkupComponent::General(events) => events.clone(),
            MarkupComponent::BlockProperties(p) => p.events(),
            MarkupComponent::ParagraphBlockProperties(p) => p.events(),
            MarkupComponent::RunProperties(p) => p.events(),
        }
    }

    /// The element name of named components.
    pub fn name(&self) -> Option<&QName> {
        match self {
            MarkupComponent::Start(e)
            | MarkupComponent::EmptyElement(e)
            | MarkupComponent::ParagraphStart { start: e, .. } => Some(&e.name),
            MarkupComponent::End(e) => Some(&e.name),
            MarkupComponent::General(_)
            | MarkupComponent::BlockProperties(_)
            | MarkupComponent::ParagraphBlockProperties(_)
            | MarkupComponent::RunProperties(_) => None,
        }
    }

    /// The start element of start-like components.
    pub fn start_element(&self) -> Option<&StartElement> {
        match self {
            MarkupComponent::Start(e)
            | MarkupComponent::EmptyElement(e)
            | MarkupComponent::ParagraphStart { start: e, .. } => Some(e),
            _ => None,
        }
    }

    pub fn start_element_mut(&mut self) -> Option<&mut StartElement> {
        match self {
            MarkupComponent::Start(e)
            | MarkupComponent::EmptyElement(e)
            | MarkupComponent::ParagraphStart { start: e, .. } => Some(e),
            _ => None,
        }
    }

    /// Whether an attribute named `local` holds one of `values`.
    pub fn contains_attribute_with_any_of_values(&self, local: &str, values: &[&str]) -> bool {
        self.start_element().is_some_and(|s| {
            s.attributes
                .iter()
                .any(|a| a.name.local == local && values.contains(&a.value.as_str()))
        })
    }

    /// General markup made of whitespace, comments and processing
    /// instructions only.
    pub fn is_whitespace(&self) -> bool {
        match self {
            MarkupComponent::General(events) => events.iter().all(|e| match e {
                XmlEvent::Characters(text) => text.chars().all(|c| matches!(c, ' ' | '\t' | '\r' | '\n')),
                XmlEvent::Comment(_) | XmlEvent::ProcessingInstruction(_) => true,
                _ => false,
            }),
            _ => false,
        }
    }

    fn is_start_named(&self, local: &str) -> bool {
        matches!(self, MarkupComponent::Start(e) if e.name.local == local)
    }

    fn is_end_named(&self, local: &str) -> bool {
        matches!(self, MarkupComponent::End(e) if e.name.local == local)
    }

    pub fn is_sheet_view_start(&self) -> bool {
        self.is_start_named(LOCAL_SHEET_VIEW)
    }

    pub fn is_alignment_empty_element(&self) -> bool {
        matches!(self, MarkupComponent::EmptyElement(e) if e.name.local == LOCAL_ALIGNMENT)
    }

    pub fn is_presentation_start(&self) -> bool {
        self.is_start_named(LOCAL_PRESENTATION)
    }

    pub fn is_table_start(&self) -> bool {
        self.is_start_named(LOCAL_TABLE)
    }

    pub fn is_text_body_start(&self) -> bool {
        self.is_start_named(LOCAL_TEXT_BODY)
    }

    #[inline]
    pub fn is_paragraph_start(&self) -> bool {
        matches!(self, MarkupComponent::ParagraphStart { .. })
    }

    pub fn is_word_styles_start(&self) -> bool {
        self.is_start_named(LOCAL_STYLES)
    }

    pub fn is_word_styles_end(&self) -> bool {
        self.is_end_named(LOCAL_STYLES)
    }

    pub fn is_word_document_defaults_start(&self) -> bool {
        self.is_start_named(LOCAL_DOC_DEFAULTS)
    }

    pub fn is_word_document_defaults_end(&self) -> bool {
        self.is_end_named(LOCAL_DOC_DEFAULTS)
    }

    pub fn is_word_style_start(&self) -> bool {
        self.is_start_named(LOCAL_STYLE)
    }

    pub fn is_word_style_end(&self) -> bool {
        self.is_end_named(LOCAL_STYLE)
    }

    pub fn is_word_paragraph_properties_default_start(&self) -> bool {
        matches!(self, MarkupComponent::ParagraphStart { start, .. } if start.name.local == LOCAL_PARAGRAPH_PROPERTIES_DEFAULT)
    }

    pub fn is_word_run_properties_default_start(&self) -> bool {
        self.is_start_named(LOCAL_RUN_PROPERTIES_DEFAULT)
    }

    pub fn is_word_run_properties_default_end(&self) -> bool {
        self.is_end_named(LOCAL_RUN_PROPERTIES_DEFAULT)
    }

    #[inline]
    pub fn is_paragraph_block_properties(&self) -> bool {
        matches!(self, MarkupComponent::ParagraphBlockProperties(_))
    }

    #[inline]
    pub fn is_run_properties(&self) -> bool {
        matches!(self, MarkupComponent::RunProperties(_))
    }

    pub fn is_table_block_properties(&self) -> bool {
        matches!(self, MarkupComponent::BlockProperties(p) if p.name().local == TABLE_PROPERTIES)
    }
}

impl PartialEq for MarkupComponent {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Start(a), Self::Start(b)) | (Self::EmptyElement(a), Self::EmptyElement(b)) => a == b,
            (Self::End(a), Self::End(b)) => a == b,
            (Self::ParagraphStart { start: a, styles: x }, Self::ParagraphStart { start: b, styles: y }) => {
                a == b && Arc::ptr_eq(x, y)
            },
            (Self::General(a), Self::General(b)) => a == b,
            (Self::BlockProperties(a), Self::BlockProperties(b)) => a == b,
            (Self::ParagraphBlockProperties(a), Self::ParagraphBlockProperties(b)) => a == b,
            (Self::RunProperties(a), Self::RunProperties(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::event::names::{dml, wpml};
    use crate::ooxml::styles::StyleDefinitions;

    #[test]
    fn test_events() {
        let empty = MarkupComponent::EmptyElement(StartElement::new(wpml("tab")));
        assert_eq!(empty.events().len(), 2);
        assert_eq!(MarkupComponent::end(EndElement::new(wpml("p"))).events().len(), 1);
        assert!(MarkupComponent::BlockProperties(BlockProperties::empty(wpml("tblPr")))
            .events()
            .is_empty());
    }

    #[test]
    fn test_whitespace_general_markup() {
        let general = MarkupComponent::General(vec![XmlEvent::characters(" \n"), XmlEvent::Comment("c".into())]);
        assert!(general.is_whitespace());
        let nbsp = MarkupComponent::General(vec![XmlEvent::characters("\u{a0}")]);
        assert!(!nbsp.is_whitespace());
    }

    #[test]
    fn test_predicates() {
        let styles = StyleDefinitions::shared(StyleDefinitions::Empty);
        let paragraph = MarkupComponent::paragraph_start(StartElement::new(wpml("pPrDefault")), styles.clone());
        assert!(paragraph.is_paragraph_start());
        assert!(paragraph.is_word_paragraph_properties_default_start());
        assert!(MarkupComponent::start(StartElement::new(dml("tbl"))).is_table_start());
        assert!(MarkupComponent::end(EndElement::new(wpml("styles"))).is_word_styles_end());
        assert_eq!(paragraph, MarkupComponent::paragraph_start(StartElement::new(wpml("pPrDefault")), styles));
    }

    #[test]
    fn test_block_properties_typing() {
        let paragraph = MarkupComponent::from_block_properties(BlockProperties::empty(dml("lvl2pPr")));
        assert!(paragraph.is_paragraph_block_properties());
        let table = MarkupComponent::from_block_properties(BlockProperties::empty(wpml("tblPr")));
        assert!(table.is_table_block_properties());
    }

    #[test]
    fn test_attribute_values() {
        let start = MarkupComponent::start(StartElement::new(wpml("sheetView")).with_attribute(QName::unqualified("rightToLeft"), "1"));
        assert!(start.is_sheet_view_start());
        assert!(start.contains_attribute_with_any_of_values("rightToLeft", &["1", "true"]));
        assert!(!start.contains_attribute_with_any_of_values("rightToLeft", &["0"]));
    }
}
