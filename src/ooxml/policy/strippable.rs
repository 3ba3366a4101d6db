/// Attribute stripping rules.
use crate::ooxml::config::FilterOptions;
use crate::ooxml::event::StartElement;

const DRAWING_RUN_PROPERTIES: &[&str] = &["err", "noProof", "dirty", "smtClean", "lang", "altLang"];
const DRAWING_RUN_PROPERTIES_AGGRESSIVE: &[&str] =
    &["err", "noProof", "dirty", "smtClean", "lang", "altLang", "spc"];
const DRAWING_DIRECTION: &[&str] = &["rtl"];
const DRAWING_BODY_DIRECTION: &[&str] = &["rtlCol"];
const WORD_PARAGRAPH_REVISIONS: &[&str] = &["rsidRPr", "rsidDel", "rsidR", "rsidP", "rsidRDefault"];
const WORD_RUN_REVISIONS: &[&str] = &["rsidRPr", "rsidDel", "rsidR"];
const WORD_TABLE_ROW_REVISIONS: &[&str] = &["rsidRPr", "rsidDel", "rsidR", "rsidTr"];
const WORD_SECTION_PROPERTIES_REVISIONS: &[&str] = &["rsidRPr", "rsidDel", "rsidR", "rsidSect"];

/// A set of attribute local names removed from start elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrippableAttributes {
    /// Proofing and language attributes of `a:rPr`; `spc` too when cleaning aggressively
    DrawingRunProperties { aggressive: bool },
    DrawingDirection,
    DrawingBodyDirection,
    WordParagraphRevisions,
    WordRunRevisions,
    WordTableRowRevisions,
    WordSectionPropertiesRevisions,
}

impl StrippableAttributes {
    #[inline]
    pub fn drawing_run_properties(options: &FilterOptions) -> Self {
        StrippableAttributes::DrawingRunProperties {
            aggressive: options.cleanup_aggressively,
        }
    }

    pub fn names(&self) -> &'static [&'static str] {
        match self {
            StrippableAttributes::DrawingRunProperties { aggressive: false } => DRAWING_RUN_PROPERTIES,
            StrippableAttributes::DrawingRunProperties { aggressive: true } => DRAWING_RUN_PROPERTIES_AGGRESSIVE,
            StrippableAttributes::DrawingDirection => DRAWING_DIRECTION,
            StrippableAttributes::DrawingBodyDirection => DRAWING_BODY_DIRECTION,
            StrippableAttributes::WordParagraphRevisions => WORD_PARAGRAPH_REVISIONS,
            StrippableAttributes::WordRunRevisions => WORD_RUN_REVISIONS,
            StrippableAttributes::WordTableRowRevisions => WORD_TABLE_ROW_REVISIONS,
            StrippableAttributes::WordSectionPropertiesRevisions => WORD_SECTION_PROPERTIES_REVISIONS,
        }
    }

    /// A copy of `start` without the strippable attributes.
    pub fn strip(&self, start: &StartElement) -> StartElement {
        let mut stripped = start.clone();
        self.strip_in_place(&mut stripped);
        stripped
    }

    pub fn strip_in_place(&self, start: &mut StartElement) {
        let names = self.names();
        start.attributes.retain(|a| !names.contains(&a.name.local.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::event::names::{dml, wpml};
    use crate::ooxml::event::QName;

    #[test]
    fn test_word_run_revisions() {
        let r = StartElement::new(wpml("r"))
            .with_attribute(wpml("rsidR"), "00AB")
            .with_attribute(wpml("rsidRPr"), "00CD")
            .with_attribute(wpml("rsidP"), "00EF");
        let stripped = StrippableAttributes::WordRunRevisions.strip(&r);
        assert_eq!(stripped.attributes.len(), 1);
        assert_eq!(stripped.attribute(&wpml("rsidP")), Some("00EF"));

        let stripped = StrippableAttributes::WordParagraphRevisions.strip(&r);
        assert!(!stripped.has_attributes());
    }

    #[test]
    fn test_drawing_run_properties_spacing_is_aggressive_only() {
        let rpr = StartElement::new(dml("rPr"))
            .with_attribute(QName::unqualified("lang"), "en-US")
            .with_attribute(QName::unqualified("spc"), "10")
            .with_attribute(QName::unqualified("b"), "1");

        let normal = FilterOptions::default();
        let stripped = StrippableAttributes::drawing_run_properties(&normal).strip(&rpr);
        assert_eq!(stripped.attributes.len(), 2);

        let aggressive = FilterOptions::new().with_cleanup_aggressively(true);
        let stripped = StrippableAttributes::drawing_run_properties(&aggressive).strip(&rpr);
        assert_eq!(stripped.attributes.len(), 1);
        assert_eq!(stripped.attribute_by_local("b"), Some("1"));
    }
}
